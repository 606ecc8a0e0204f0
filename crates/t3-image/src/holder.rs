//! Portable data holders
//!
//! A data holder is the tagged value representation used wherever a VM value
//! is stored in the image: a one-byte type code followed by the value.
//!
//! Only object, property, integer, enum and built-in function pointer values
//! have their own layouts here. Every other kind is read as a generic 32-bit
//! value, which is a simplification: string, list and code pointer values
//! are not distinguished further.

use crate::cursor::ByteCursor;
use crate::error::LoadError;

/// Data holder type codes
pub mod type_code {
    /// nil
    pub const NIL: u8 = 1;
    /// true
    pub const TRUE: u8 = 2;
    /// Stack pointer
    pub const STACK: u8 = 3;
    /// Code pointer
    pub const CODE_PTR: u8 = 4;
    /// Object reference
    pub const OBJ: u8 = 5;
    /// Property id
    pub const PROP: u8 = 6;
    /// 32-bit signed integer
    pub const INT: u8 = 7;
    /// Single-quoted string constant
    pub const SSTRING: u8 = 8;
    /// Double-quoted string constant
    pub const DSTRING: u8 = 9;
    /// List constant
    pub const LIST: u8 = 10;
    /// Code offset
    pub const CODE_OFS: u8 = 11;
    /// Function pointer
    pub const FUNC_PTR: u8 = 12;
    /// Empty slot
    pub const EMPTY: u8 = 13;
    /// Native code pointer
    pub const NATIVE_CODE: u8 = 14;
    /// Enumerator
    pub const ENUM: u8 = 15;
    /// Built-in function pointer
    pub const BIF_PTR: u8 = 16;
    /// Object reference used as a method context
    pub const OBJX: u8 = 17;
    /// Built-in function pointer used as a method context
    pub const BIF_PTRX: u8 = 18;
}

/// A decoded data holder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataHolder {
    /// nil
    Nil,
    /// true
    True,
    /// Stack pointer
    Stack(u32),
    /// Code pointer
    CodePtr(u32),
    /// Object id
    Object(u32),
    /// Property id
    Property(u16),
    /// Integer
    Int(i32),
    /// Offset of a single-quoted string constant
    SString(u32),
    /// Offset of a double-quoted string constant
    DString(u32),
    /// Offset of a list constant
    List(u32),
    /// Code offset
    CodeOffset(u32),
    /// Function pointer
    FuncPtr(u32),
    /// Empty
    Empty,
    /// Native code pointer
    NativeCode(u32),
    /// Enumerator id
    Enum(u32),
    /// Built-in function pointer
    BifPtr {
        /// Function index within its set
        function: u16,
        /// Function set index
        set: u16,
    },
    /// Object id used as a method context
    ObjectX(u32),
    /// Built-in function pointer used as a method context
    BifPtrX(u32),
}

impl DataHolder {
    /// Decode one data holder at the cursor
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, LoadError> {
        let offset = cursor.position();
        let code = cursor.read_u8()?;
        let value = match code {
            type_code::OBJ => DataHolder::Object(cursor.read_u32()?),
            type_code::OBJX => DataHolder::ObjectX(cursor.read_u32()?),
            type_code::PROP => DataHolder::Property(cursor.read_u16()?),
            type_code::INT => DataHolder::Int(cursor.read_i32()?),
            type_code::ENUM => DataHolder::Enum(cursor.read_u32()?),
            type_code::BIF_PTR => {
                let function = cursor.read_u16()?;
                let set = cursor.read_u16()?;
                DataHolder::BifPtr { function, set }
            }
            type_code::NIL => {
                cursor.skip(4)?;
                DataHolder::Nil
            }
            type_code::TRUE => {
                cursor.skip(4)?;
                DataHolder::True
            }
            type_code::EMPTY => {
                cursor.skip(4)?;
                DataHolder::Empty
            }
            type_code::STACK => DataHolder::Stack(cursor.read_u32()?),
            type_code::CODE_PTR => DataHolder::CodePtr(cursor.read_u32()?),
            type_code::SSTRING => DataHolder::SString(cursor.read_u32()?),
            type_code::DSTRING => DataHolder::DString(cursor.read_u32()?),
            type_code::LIST => DataHolder::List(cursor.read_u32()?),
            type_code::CODE_OFS => DataHolder::CodeOffset(cursor.read_u32()?),
            type_code::FUNC_PTR => DataHolder::FuncPtr(cursor.read_u32()?),
            type_code::NATIVE_CODE => DataHolder::NativeCode(cursor.read_u32()?),
            type_code::BIF_PTRX => DataHolder::BifPtrX(cursor.read_u32()?),
            _ => return Err(LoadError::UnknownDataHolderType { code, offset }),
        };
        Ok(value)
    }

    /// Type code of this value
    pub fn type_code(&self) -> u8 {
        match self {
            DataHolder::Nil => type_code::NIL,
            DataHolder::True => type_code::TRUE,
            DataHolder::Stack(_) => type_code::STACK,
            DataHolder::CodePtr(_) => type_code::CODE_PTR,
            DataHolder::Object(_) => type_code::OBJ,
            DataHolder::Property(_) => type_code::PROP,
            DataHolder::Int(_) => type_code::INT,
            DataHolder::SString(_) => type_code::SSTRING,
            DataHolder::DString(_) => type_code::DSTRING,
            DataHolder::List(_) => type_code::LIST,
            DataHolder::CodeOffset(_) => type_code::CODE_OFS,
            DataHolder::FuncPtr(_) => type_code::FUNC_PTR,
            DataHolder::Empty => type_code::EMPTY,
            DataHolder::NativeCode(_) => type_code::NATIVE_CODE,
            DataHolder::Enum(_) => type_code::ENUM,
            DataHolder::BifPtr { .. } => type_code::BIF_PTR,
            DataHolder::ObjectX(_) => type_code::OBJX,
            DataHolder::BifPtrX(_) => type_code::BIF_PTRX,
        }
    }

    /// Object id, for object references
    pub fn as_object(&self) -> Option<u32> {
        match self {
            DataHolder::Object(id) | DataHolder::ObjectX(id) => Some(*id),
            _ => None,
        }
    }
}
