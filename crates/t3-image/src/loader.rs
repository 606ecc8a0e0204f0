//! Block dispatcher
//!
//! A [`Loader`] is one parse session: it owns the cursor, the options and
//! the image under construction. After the header it reads one block at a
//! time, hands each handler a cursor bounded by the block's declared size,
//! and stops at the EOF block.

use crate::block::{BlockHeader, BlockOutcome, BlockSummary, BlockTag};
use crate::cursor::ByteCursor;
use crate::entry::EntryPoint;
use crate::error::{DecodeError, LoadError};
use crate::header::ImageHeader;
use crate::image::Image;
use crate::options::LoadOptions;
use crate::static_init::StaticInitializers;
use tracing::{debug, trace, warn};

/// Load an image with default options
pub fn load_image(data: &[u8]) -> Result<Image, LoadError> {
    load_image_with(data, LoadOptions::default())
}

/// Load an image with the given options
pub fn load_image_with(data: &[u8], options: LoadOptions) -> Result<Image, LoadError> {
    Loader::begin(data, options)?.run()
}

/// Image parse session
pub struct Loader<'a> {
    cursor: ByteCursor<'a>,
    options: LoadOptions,
    image: Image,
    finished: bool,
    failed: Option<LoadError>,
}

impl<'a> Loader<'a> {
    /// Validate the header and position the session at the first block
    pub fn begin(data: &'a [u8], options: LoadOptions) -> Result<Self, LoadError> {
        let mut cursor = ByteCursor::new(data);
        let header = ImageHeader::read(&mut cursor, &options)?;
        Ok(Self {
            cursor,
            options,
            image: Image::new(header),
            finished: false,
            failed: None,
        })
    }

    /// Absolute offset of the next unread byte
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// True once the EOF block has been read
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The image as built so far
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// The error that ended this session, if any
    pub fn error(&self) -> Option<&LoadError> {
        self.failed.as_ref()
    }

    /// Read all remaining blocks and return the image
    ///
    /// Fails with the stored error if an earlier [`Loader::step`] failed.
    pub fn run(mut self) -> Result<Image, LoadError> {
        if let Some(err) = self.failed.take() {
            return Err(err);
        }
        while !self.finished {
            self.step()?;
        }
        debug!(
            blocks = self.image.blocks.len(),
            objects = self.image.objects.len(),
            pools = self.image.pools.len(),
            "image loaded"
        );
        Ok(self.image)
    }

    /// Process the next block
    ///
    /// On success the cursor sits at the following block's tag (or just past
    /// the EOF block header). Every error is fatal: once a step fails, later
    /// calls return the same error without reading further.
    pub fn step(&mut self) -> Result<BlockSummary, LoadError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let result = self.read_block();
        if let Err(err) = &result {
            self.failed = Some(err.clone());
        }
        result
    }

    fn read_block(&mut self) -> Result<BlockSummary, LoadError> {
        let header = BlockHeader::read(&mut self.cursor)?;
        trace!(
            tag = %header.tag,
            offset = header.offset,
            size = header.size,
            flags = header.flags,
            "block"
        );

        let outcome = if header.tag == BlockTag::Eof {
            self.finished = true;
            BlockOutcome::End
        } else {
            let mut payload = self.cursor.sub_cursor(header.size as usize)?;
            let outcome = self
                .dispatch(&header, &mut payload)
                .map_err(|err| overrun(&header, err))?;
            if outcome == BlockOutcome::Loaded {
                self.check_consumed(&header, &payload)?;
            }
            outcome
        };

        let summary = BlockSummary {
            tag: header.tag,
            offset: header.offset,
            size: header.size,
            flags: header.flags,
            outcome,
        };
        self.image.blocks.push(summary.clone());
        Ok(summary)
    }

    fn dispatch(
        &mut self,
        header: &BlockHeader,
        payload: &mut ByteCursor<'a>,
    ) -> Result<BlockOutcome, LoadError> {
        match &header.tag {
            BlockTag::Entp => {
                if self.image.entry_point.is_some() {
                    return Err(LoadError::DuplicateEntryPoint {
                        offset: header.offset,
                    });
                }
                let entry = EntryPoint::decode(payload)?;
                debug!(code_offset = entry.code_offset, "entry point");
                self.image.entry_point = Some(entry);
            }
            BlockTag::Cpdf => {
                self.image.pools.load_definition(payload)?;
            }
            BlockTag::Cppg => {
                self.image
                    .pools
                    .load_page(payload, self.options.one_based_page_pool_ids)?;
            }
            BlockTag::Objs => {
                self.image
                    .objects
                    .load_block(payload, self.options.reject_object_redefinition)?;
            }
            BlockTag::Mcld => {
                self.image.metaclasses.load_block(payload)?;
            }
            BlockTag::Fnsd => {
                self.image.function_sets.load_block(payload)?;
            }
            BlockTag::Sini => {
                let inits = StaticInitializers::decode(payload)?;
                debug!(count = inits.count, "static initializers");
                if self.image.static_initializers.replace(inits).is_some() {
                    warn!(offset = header.offset, "SINI block replaces an earlier one");
                }
            }
            BlockTag::Mres | BlockTag::Mrel => {
                warn!(
                    tag = %header.tag,
                    offset = header.offset,
                    size = header.size,
                    "multimedia resources are not supported; skipping block"
                );
                return Ok(BlockOutcome::Unsupported);
            }
            BlockTag::Symd => {
                debug!(
                    offset = header.offset,
                    size = header.size,
                    "symbol export decoding is disabled; skipping block"
                );
                return Ok(BlockOutcome::Unsupported);
            }
            BlockTag::Eof => return Ok(BlockOutcome::End),
            BlockTag::Srcf
            | BlockTag::Gsym
            | BlockTag::Macr
            | BlockTag::Mhls
            | BlockTag::Other(_) => {
                if header.is_mandatory() {
                    return Err(LoadError::UnknownMandatoryBlock {
                        tag: header.tag.to_string(),
                        offset: header.offset,
                    });
                }
                warn!(
                    tag = %header.tag,
                    offset = header.offset,
                    size = header.size,
                    "skipping unrecognized block"
                );
                return Ok(BlockOutcome::Skipped);
            }
        }
        Ok(BlockOutcome::Loaded)
    }

    /// Report payload bytes a handler left unread
    ///
    /// ENTP, CPDF and SINI may carry reserved trailing bytes; for the other
    /// blocks leftovers mean the declared size disagrees with the contents.
    fn check_consumed(
        &self,
        header: &BlockHeader,
        payload: &ByteCursor<'a>,
    ) -> Result<(), LoadError> {
        let remaining = payload.remaining();
        if remaining == 0 {
            return Ok(());
        }
        match header.tag {
            BlockTag::Objs | BlockTag::Mcld | BlockTag::Fnsd => {
                if self.options.strict_block_sizes {
                    return Err(LoadError::UnconsumedBytes {
                        tag: header.tag.to_string(),
                        offset: header.offset,
                        remaining,
                    });
                }
                warn!(
                    tag = %header.tag,
                    offset = header.offset,
                    remaining,
                    "block has unread trailing bytes"
                );
            }
            _ => trace!(tag = %header.tag, remaining, "skipped reserved bytes"),
        }
        Ok(())
    }
}

/// A handler running off the end of its bounded payload cursor has read
/// past the block's declared size
fn overrun(header: &BlockHeader, err: LoadError) -> LoadError {
    match err {
        LoadError::Decode(DecodeError::UnexpectedEof { .. }) => LoadError::BlockOverrun {
            tag: header.tag.to_string(),
            offset: header.offset,
            size: header.size,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{flags, BLOCK_HEADER_SIZE};
    use crate::error::ErrorKind;
    use crate::header::HEADER_SIZE;
    use crate::writer::ImageWriter;

    fn image_with(build: impl FnOnce(&mut ImageWriter)) -> Vec<u8> {
        let mut w = ImageWriter::with_header();
        build(&mut w);
        w.eof();
        w.into_bytes()
    }

    #[test]
    fn test_empty_image() {
        let bytes = image_with(|_| {});
        let image = load_image(&bytes).unwrap();
        assert!(image.entry_point.is_none());
        assert!(image.objects.is_empty());
        assert_eq!(image.blocks.len(), 1);
        assert_eq!(image.blocks[0].outcome, BlockOutcome::End);
    }

    #[test]
    fn test_skip_lands_on_next_tag() {
        let bytes = image_with(|w| {
            w.block("XTRA", 0, &[0xAA; 37]);
        });
        let mut loader = Loader::begin(&bytes, LoadOptions::default()).unwrap();
        assert_eq!(loader.position(), HEADER_SIZE);

        let summary = loader.step().unwrap();
        assert_eq!(summary.outcome, BlockOutcome::Skipped);
        assert_eq!(summary.tag, BlockTag::Other("XTRA".to_string()));
        assert_eq!(loader.position(), HEADER_SIZE + BLOCK_HEADER_SIZE + 37);

        assert_eq!(loader.step().unwrap().outcome, BlockOutcome::End);
        assert!(loader.is_finished());
    }

    #[test]
    fn test_unknown_mandatory_block() {
        let bytes = image_with(|w| {
            w.block("GSYM", flags::MANDATORY, &[0; 4]);
        });
        let err = load_image(&bytes).unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownMandatoryBlock {
                tag: "GSYM".to_string(),
                offset: HEADER_SIZE,
            }
        );
        assert_eq!(err.kind(), ErrorKind::UnknownMandatoryBlock);
    }

    #[test]
    fn test_unsupported_blocks_skipped_even_when_mandatory() {
        let bytes = image_with(|w| {
            w.block("MRES", flags::MANDATORY, &[1, 2, 3]);
            w.block("MREL", 0, &[]);
            w.block("SYMD", flags::MANDATORY, &[9; 12]);
        });
        let image = load_image(&bytes).unwrap();
        let outcomes: Vec<BlockOutcome> = image.blocks.iter().map(|b| b.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                BlockOutcome::Unsupported,
                BlockOutcome::Unsupported,
                BlockOutcome::Unsupported,
                BlockOutcome::End,
            ]
        );
    }

    #[test]
    fn test_handler_overrun() {
        let bytes = image_with(|w| {
            // FNSD claiming one name but carrying only its length byte
            w.block("FNSD", 0, &[1, 0, 4]);
        });
        let err = load_image(&bytes).unwrap_err();
        assert_eq!(
            err,
            LoadError::BlockOverrun {
                tag: "FNSD".to_string(),
                offset: HEADER_SIZE,
                size: 3,
            }
        );
    }

    #[test]
    fn test_short_page_block() {
        let bytes = image_with(|w| {
            w.pool_definition(0, 1, 16);
            w.block("CPPG", 0, &[0, 0, 0, 0]);
        });
        let err = load_image(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::BlockOverrun { size: 4, .. }));
    }

    #[test]
    fn test_trailing_bytes_strictness() {
        let bytes = image_with(|w| {
            w.block("FNSD", 0, &[0, 0, 0xFF]);
        });
        assert!(load_image(&bytes).is_ok());

        let options = LoadOptions {
            strict_block_sizes: true,
            ..LoadOptions::default()
        };
        let err = load_image_with(&bytes, options).unwrap_err();
        assert!(matches!(err, LoadError::UnconsumedBytes { remaining: 1, .. }));
    }

    #[test]
    fn test_block_larger_than_file() {
        let mut w = ImageWriter::with_header();
        w.emit_raw(b"OBJS");
        w.emit_raw(&100u32.to_le_bytes());
        w.emit_raw(&0u16.to_le_bytes());
        w.emit_raw(&[0; 10]);
        let err = load_image(&w.into_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eof);
    }

    #[test]
    fn test_missing_eof_block() {
        let mut w = ImageWriter::with_header();
        w.function_sets(&["t3vm/010006"]);
        let err = load_image(&w.into_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eof);
    }

    #[test]
    fn test_static_initializers_replaced() {
        let bytes = image_with(|w| {
            w.static_initializers(0x10, &[[1; 6]]);
            w.static_initializers(0x20, &[]);
        });
        let image = load_image(&bytes).unwrap();
        let inits = image.static_initializers.unwrap();
        assert_eq!(inits.static_code_offset, 0x20);
        assert_eq!(inits.count, 0);
    }

    #[test]
    fn test_session_stays_failed_after_error() {
        let bytes = image_with(|w| {
            w.block("ENTP", 0, &[0; 16]);
            w.block("ENTP", 0, &[0; 16]);
            w.block("GSYM", flags::MANDATORY, &[0; 4]);
            w.objects(0, 0, &[(1, vec![0; 2])]);
        });
        let mut loader = Loader::begin(&bytes, LoadOptions::default()).unwrap();
        assert_eq!(loader.step().unwrap().tag, BlockTag::Entp);

        let duplicate = LoadError::DuplicateEntryPoint {
            offset: HEADER_SIZE + BLOCK_HEADER_SIZE + 16,
        };
        assert_eq!(loader.step().unwrap_err(), duplicate);
        let position = loader.position();

        // Later steps repeat the first error and do not read on
        assert_eq!(loader.step().unwrap_err(), duplicate);
        assert_eq!(loader.position(), position);
        assert_eq!(loader.error(), Some(&duplicate));

        assert_eq!(loader.run().unwrap_err(), duplicate);
    }
}
