// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Wire-format primitives shared by every SPDM message: a `Reader`/`Writer`
//! pair over a plain byte slice, a `Codec` trait each field type implements,
//! and an `enum_builder!` macro for the many closed-but-extensible u8/u16/u32
//! enums the protocol defines (unknown wire values round-trip instead of
//! failing to decode).

#![no_std]

use core::convert::TryFrom;

/// A cursor over an immutable byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn init(buf: &'a [u8]) -> Self {
        Reader { buf, offset: 0 }
    }

    /// Bytes remaining to be read.
    pub fn left(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Bytes already consumed.
    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.left() < len {
            return None;
        }
        let out = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Some(out)
    }

    pub fn byte(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn peek(&self, len: usize) -> Option<&'a [u8]> {
        if self.left() < len {
            return None;
        }
        Some(&self.buf[self.offset..self.offset + len])
    }
}

/// A cursor over a mutable byte slice. Writes beyond the slice are silently
/// dropped by `used()` remaining short, matching the teacher's fixed-buffer,
/// panic-free encode path — callers size buffers generously and check
/// `used()`.
pub struct Writer<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> Writer<'a> {
    pub fn init(buf: &'a mut [u8]) -> Self {
        Writer { buf, offset: 0 }
    }

    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn left(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn push(&mut self, data: &[u8]) -> usize {
        let n = core::cmp::min(data.len(), self.left());
        self.buf[self.offset..self.offset + n].copy_from_slice(&data[..n]);
        self.offset += n;
        n
    }

    pub fn mut_used_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..self.offset]
    }
}

/// A field type that can be serialized to and deserialized from the SPDM
/// wire format. All multi-byte integers are little-endian.
pub trait Codec: Sized {
    fn encode(&self, bytes: &mut Writer);
    fn read(r: &mut Reader) -> Option<Self>;
}

macro_rules! impl_codec_for_uint {
    ($ty:ty) => {
        impl Codec for $ty {
            fn encode(&self, bytes: &mut Writer) {
                bytes.push(&self.to_le_bytes());
            }
            fn read(r: &mut Reader) -> Option<Self> {
                let len = core::mem::size_of::<$ty>();
                let raw = r.take(len)?;
                let mut buf = [0u8; core::mem::size_of::<$ty>()];
                buf.copy_from_slice(raw);
                Some(<$ty>::from_le_bytes(buf))
            }
        }
    };
}

impl_codec_for_uint!(u16);
impl_codec_for_uint!(u32);
impl_codec_for_uint!(u64);

impl Codec for u8 {
    fn encode(&self, bytes: &mut Writer) {
        bytes.push(&[*self]);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        r.byte()
    }
}

/// 24-bit little-endian integer, used by measurement block lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct U24(pub u32);

impl Codec for U24 {
    fn encode(&self, bytes: &mut Writer) {
        let b = self.0.to_le_bytes();
        bytes.push(&b[..3]);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let raw = r.take(3)?;
        Some(U24(u32::from(raw[0]) | u32::from(raw[1]) << 8 | u32::from(raw[2]) << 16))
    }
}

impl<const N: usize> Codec for [u8; N] {
    fn encode(&self, bytes: &mut Writer) {
        bytes.push(self);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let raw = r.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(raw);
        Some(out)
    }
}

/// Declares a closed-but-extensible wire enum: known values decode to named
/// variants, anything else decodes to `Unknown(raw)` rather than failing,
/// matching every SPDM code table (request/response codes, algorithm ids,
/// error codes, ...) where reserved/future values must round-trip.
#[macro_export]
macro_rules! enum_builder {
    (@U8
     EnumName: $enum_name:ident;
     EnumVal{$($enum_variant:ident => $enum_value:expr),*}
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $($enum_variant,)*
            Unknown(u8),
        }
        impl Default for $enum_name {
            fn default() -> Self {
                $crate::enum_builder!(@first_variant $enum_name; $($enum_variant),*)
            }
        }
        impl $enum_name {
            pub fn get_u8(&self) -> u8 {
                match self {
                    $($enum_name::$enum_variant => $enum_value,)*
                    $enum_name::Unknown(v) => *v,
                }
            }
        }
        impl $crate::Codec for $enum_name {
            fn encode(&self, bytes: &mut $crate::Writer) {
                self.get_u8().encode(bytes);
            }
            fn read(r: &mut $crate::Reader) -> Option<$enum_name> {
                let v = u8::read(r)?;
                Some(match v {
                    $($enum_value => $enum_name::$enum_variant,)*
                    _ => $enum_name::Unknown(v),
                })
            }
        }
    };
    (@U16
     EnumName: $enum_name:ident;
     EnumVal{$($enum_variant:ident => $enum_value:expr),*}
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $($enum_variant,)*
            Unknown(u16),
        }
        impl Default for $enum_name {
            fn default() -> Self {
                $crate::enum_builder!(@first_variant $enum_name; $($enum_variant),*)
            }
        }
        impl $enum_name {
            pub fn get_u16(&self) -> u16 {
                match self {
                    $($enum_name::$enum_variant => $enum_value,)*
                    $enum_name::Unknown(v) => *v,
                }
            }
        }
        impl $crate::Codec for $enum_name {
            fn encode(&self, bytes: &mut $crate::Writer) {
                self.get_u16().encode(bytes);
            }
            fn read(r: &mut $crate::Reader) -> Option<$enum_name> {
                let v = u16::read(r)?;
                Some(match v {
                    $($enum_value => $enum_name::$enum_variant,)*
                    _ => $enum_name::Unknown(v),
                })
            }
        }
    };
    (@first_variant $enum_name:ident; $first:ident $(, $rest:ident)*) => {
        $enum_name::$first
    };
}

/// Fallible narrowing used by length-prefixed field decoders; kept here so
/// callers don't each re-derive the same `TryFrom<usize>` boilerplate.
pub fn checked_len(len: usize, max: usize) -> Option<usize> {
    if len <= max {
        Some(len)
    } else {
        None
    }
}

pub fn u16_from_usize(v: usize) -> Option<u16> {
    u16::try_from(v).ok()
}
