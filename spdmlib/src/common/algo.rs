// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The Negotiated Algorithm Suite (spec §3) and the fixed-size wire
//! structures (digests, signatures, nonces, measurement blocks) every
//! message payload is built from.

use codec::{enum_builder, Codec, Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::config::*;

enum_builder! {
    @U8
    EnumName: SpdmVersion;
    EnumVal{
        SpdmVersion10 => 0x10,
        SpdmVersion11 => 0x11,
        SpdmVersion12 => 0x12
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmRequestCapabilityFlags: u32 {
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0000_0001_0000_0000;
        const KEY_EX_CAP = 0b0000_0010_0000_0000;
        const PSK_CAP = 0b0000_0100_0000_0000;
        const ENCAP_CAP = 0b0001_0000_0000_0000;
        const HBEAT_CAP = 0b0010_0000_0000_0000;
        const KEY_UPD_CAP = 0b0100_0000_0000_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000_0000;
        const CHUNK_CAP = 0b1000_0000_0000_0000_0000;
    }
}

impl Codec for SpdmRequestCapabilityFlags {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let bits = u32::read(r)?;
        Some(Self::from_bits_truncate(bits))
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmResponseCapabilityFlags: u32 {
        const CACHE_CAP = 0b0000_0001;
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const MEAS_CAP_NO_SIG = 0b0000_1000;
        const MEAS_CAP_SIG = 0b0001_0000;
        const MEAS_FRESH_CAP = 0b0010_0000;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0000_0001_0000_0000;
        const KEY_EX_CAP = 0b0000_0010_0000_0000;
        const PSK_CAP = 0b0000_0100_0000_0000;
        const PSK_RESPONDER_WITH_CONTEXT_CAP = 0b0000_1000_0000_0000;
        const ENCAP_CAP = 0b0001_0000_0000_0000;
        const HBEAT_CAP = 0b0010_0000_0000_0000;
        const KEY_UPD_CAP = 0b0100_0000_0000_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000_0000;
        const CHUNK_CAP = 0b1000_0000_0000_0000_0000;
    }
}

impl Codec for SpdmResponseCapabilityFlags {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let bits = u32::read(r)?;
        Some(Self::from_bits_truncate(bits))
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmMeasurementSpecification: u8 {
        const DMTF = 0b0000_0001;
    }
}
impl Codec for SpdmMeasurementSpecification {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        Some(Self::from_bits_truncate(u8::read(r)?))
    }
}

macro_rules! algo_bitflags_u32 {
    ($name:ident { $($variant:ident = $bit:expr),* $(,)? }) => {
        bitflags! {
            #[derive(Default)]
            pub struct $name: u32 {
                $(const $variant = $bit;)*
            }
        }
        impl Codec for $name {
            fn encode(&self, bytes: &mut Writer) {
                self.bits().encode(bytes);
            }
            fn read(r: &mut Reader) -> Option<Self> {
                Some(Self::from_bits_truncate(u32::read(r)?))
            }
        }
    };
}

macro_rules! algo_bitflags_u16 {
    ($name:ident { $($variant:ident = $bit:expr),* $(,)? }) => {
        bitflags! {
            #[derive(Default)]
            pub struct $name: u16 {
                $(const $variant = $bit;)*
            }
        }
        impl Codec for $name {
            fn encode(&self, bytes: &mut Writer) {
                self.bits().encode(bytes);
            }
            fn read(r: &mut Reader) -> Option<Self> {
                Some(Self::from_bits_truncate(u16::read(r)?))
            }
        }
    };
}

algo_bitflags_u32!(SpdmMeasurementHashAlgo {
    RAW_BIT_STREAM = 0b0000_0001,
    TPM_ALG_SHA_256 = 0b0000_0010,
    TPM_ALG_SHA_384 = 0b0000_0100,
    TPM_ALG_SHA_512 = 0b0000_1000,
    TPM_ALG_SHA3_256 = 0b0001_0000,
    TPM_ALG_SHA3_384 = 0b0010_0000,
    TPM_ALG_SHA3_512 = 0b0100_0000,
});

algo_bitflags_u32!(SpdmBaseAsymAlgo {
    TPM_ALG_RSASSA_2048 = 0b0000_0001,
    TPM_ALG_RSAPSS_2048 = 0b0000_0010,
    TPM_ALG_RSASSA_3072 = 0b0000_0100,
    TPM_ALG_RSAPSS_3072 = 0b0000_1000,
    TPM_ALG_ECDSA_ECC_NIST_P256 = 0b0001_0000,
    TPM_ALG_RSASSA_4096 = 0b0010_0000,
    TPM_ALG_RSAPSS_4096 = 0b0100_0000,
    TPM_ALG_ECDSA_ECC_NIST_P384 = 0b1000_0000,
    TPM_ALG_ECDSA_ECC_NIST_P521 = 0b0001_0000_0000,
});

algo_bitflags_u32!(SpdmBaseHashAlgo {
    TPM_ALG_SHA_256 = 0b0000_0001,
    TPM_ALG_SHA_384 = 0b0000_0010,
    TPM_ALG_SHA_512 = 0b0000_0100,
    TPM_ALG_SHA3_256 = 0b0000_1000,
    TPM_ALG_SHA3_384 = 0b0001_0000,
    TPM_ALG_SHA3_512 = 0b0010_0000,
});

algo_bitflags_u16!(SpdmDheAlgo {
    FFDHE_2048 = 0b0000_0001,
    FFDHE_3072 = 0b0000_0010,
    FFDHE_4096 = 0b0000_0100,
    SECP_256_R1 = 0b0000_1000,
    SECP_384_R1 = 0b0001_0000,
    SECP_521_R1 = 0b0010_0000,
});

algo_bitflags_u16!(SpdmAeadAlgo {
    AES_128_GCM = 0b0000_0001,
    AES_256_GCM = 0b0000_0010,
    CHACHA20_POLY1305 = 0b0000_0100,
});

algo_bitflags_u16!(SpdmReqAsymAlgo {
    TPM_ALG_RSASSA_2048 = 0b0000_0001,
    TPM_ALG_RSAPSS_2048 = 0b0000_0010,
    TPM_ALG_RSASSA_3072 = 0b0000_0100,
    TPM_ALG_RSAPSS_3072 = 0b0000_1000,
    TPM_ALG_ECDSA_ECC_NIST_P256 = 0b0001_0000,
    TPM_ALG_RSASSA_4096 = 0b0010_0000,
    TPM_ALG_RSAPSS_4096 = 0b0100_0000,
    TPM_ALG_ECDSA_ECC_NIST_P384 = 0b1000_0000,
});

algo_bitflags_u16!(SpdmKeyScheduleAlgo {
    SPDM_KEY_SCHEDULE = 0b0000_0001,
});

impl SpdmBaseHashAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmBaseHashAlgo::TPM_ALG_SHA_256 => 32,
            SpdmBaseHashAlgo::TPM_ALG_SHA_384 => 48,
            SpdmBaseHashAlgo::TPM_ALG_SHA_512 => 64,
            SpdmBaseHashAlgo::TPM_ALG_SHA3_256 => 32,
            SpdmBaseHashAlgo::TPM_ALG_SHA3_384 => 48,
            SpdmBaseHashAlgo::TPM_ALG_SHA3_512 => 64,
            _ => 0,
        }
    }
}

impl SpdmMeasurementHashAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_256 => 32,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_384 => 48,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_512 => 64,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA3_256 => 32,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA3_384 => 48,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA3_512 => 64,
            _ => 0,
        }
    }
}

impl SpdmAeadAlgo {
    pub fn get_key_size(&self) -> u16 {
        match *self {
            SpdmAeadAlgo::AES_128_GCM => 16,
            SpdmAeadAlgo::AES_256_GCM => 32,
            SpdmAeadAlgo::CHACHA20_POLY1305 => 32,
            _ => 0,
        }
    }
    pub fn get_iv_size(&self) -> u16 {
        12
    }
    pub fn get_tag_size(&self) -> u16 {
        16
    }
}

impl SpdmBaseAsymAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048 | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_2048 => 256,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072 | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072 => 384,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096 | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_4096 => 512,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256 => 64,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384 => 96,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P521 => 132,
            _ => 0,
        }
    }
}

impl SpdmDheAlgo {
    pub fn get_size(&self) -> u16 {
        match *self {
            SpdmDheAlgo::FFDHE_2048 => 256,
            SpdmDheAlgo::FFDHE_3072 => 384,
            SpdmDheAlgo::FFDHE_4096 => 512,
            SpdmDheAlgo::SECP_256_R1 => 64,
            SpdmDheAlgo::SECP_384_R1 => 96,
            SpdmDheAlgo::SECP_521_R1 => 132,
            _ => 0,
        }
    }
}

/// A fixed-capacity buffer sized to the largest negotiable hash digest.
#[derive(Debug, Clone, Copy)]
pub struct SpdmDigestStruct {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_HASH_SIZE],
}

impl Default for SpdmDigestStruct {
    fn default() -> Self {
        SpdmDigestStruct {
            data_size: 0,
            data: [0u8; SPDM_MAX_HASH_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmDigestStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl SpdmDigestStruct {
    pub fn from_slice(data: &[u8]) -> Self {
        let mut out = Self::default();
        out.data_size = data.len() as u16;
        out.data[..data.len()].copy_from_slice(data);
        out
    }
}

/// Wire length is the negotiated base hash size, not `SPDM_MAX_HASH_SIZE`.
impl SpdmCodec for SpdmDigestStruct {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let size = context.negotiate_info.base_hash_sel.get_size() as usize;
        bytes.push(&self.data[..size]);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let size = context.negotiate_info.base_hash_sel.get_size() as usize;
        let raw = r.take(size)?;
        Some(SpdmDigestStruct::from_slice(raw))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmSignatureStruct {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_ASYM_KEY_SIZE],
}

impl Default for SpdmSignatureStruct {
    fn default() -> Self {
        SpdmSignatureStruct {
            data_size: 0,
            data: [0u8; SPDM_MAX_ASYM_KEY_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmSignatureStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl SpdmSignatureStruct {
    pub fn from_slice(data: &[u8]) -> Self {
        let mut out = Self::default();
        out.data_size = data.len() as u16;
        out.data[..data.len()].copy_from_slice(data);
        out
    }
}

/// Wire length is the negotiated base asym signature size.
impl SpdmCodec for SpdmSignatureStruct {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let size = context.negotiate_info.base_asym_sel.get_size() as usize;
        bytes.push(&self.data[..size]);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let size = context.negotiate_info.base_asym_sel.get_size() as usize;
        let raw = r.take(size)?;
        Some(SpdmSignatureStruct::from_slice(raw))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmNonceStruct {
    pub data: [u8; SPDM_NONCE_SIZE],
}

impl Codec for SpdmNonceStruct {
    fn encode(&self, bytes: &mut Writer) {
        bytes.push(&self.data);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        Some(SpdmNonceStruct {
            data: <[u8; SPDM_NONCE_SIZE]>::read(r)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmDheExchangeStruct {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_DHE_KEY_SIZE],
}

impl Default for SpdmDheExchangeStruct {
    fn default() -> Self {
        SpdmDheExchangeStruct {
            data_size: 0,
            data: [0u8; SPDM_MAX_DHE_KEY_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmDheExchangeStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl SpdmDheExchangeStruct {
    pub fn from_slice(data: &[u8]) -> Self {
        let mut out = Self::default();
        out.data_size = data.len() as u16;
        out.data[..data.len()].copy_from_slice(data);
        out
    }
}

/// Wire length is the negotiated DHE group's public-value size.
impl SpdmCodec for SpdmDheExchangeStruct {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let size = context.negotiate_info.dhe_sel.get_size() as usize;
        bytes.push(&self.data[..size]);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let size = context.negotiate_info.dhe_sel.get_size() as usize;
        let raw = r.take(size)?;
        Some(SpdmDheExchangeStruct::from_slice(raw))
    }
}

enum_builder! {
    @U8
    EnumName: SpdmDmtfMeasurementType;
    EnumVal{
        SpdmDmtfMeasurementRom => 0x0,
        SpdmDmtfMeasurementFirmware => 0x1,
        SpdmDmtfMeasurementHardwareConfig => 0x2,
        SpdmDmtfMeasurementFirmwareConfig => 0x3,
        SpdmDmtfMeasurementManifest => 0x4
    }
}

enum_builder! {
    @U8
    EnumName: SpdmDmtfMeasurementRepresentation;
    EnumVal{
        SpdmDmtfMeasurementDigest => 0x0,
        SpdmDmtfMeasurementRawBit => 0x1
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmDmtfMeasurementStructure {
    pub r#type: SpdmDmtfMeasurementType,
    pub representation: SpdmDmtfMeasurementRepresentation,
    pub value_size: u16,
    pub value: [u8; MAX_SPDM_MEASUREMENT_VALUE_LEN],
}

impl Default for SpdmDmtfMeasurementStructure {
    fn default() -> Self {
        SpdmDmtfMeasurementStructure {
            r#type: SpdmDmtfMeasurementType::default(),
            representation: SpdmDmtfMeasurementRepresentation::default(),
            value_size: 0,
            value: [0u8; MAX_SPDM_MEASUREMENT_VALUE_LEN],
        }
    }
}

impl Codec for SpdmDmtfMeasurementStructure {
    fn encode(&self, bytes: &mut Writer) {
        let type_value = self.r#type.get_u8() | (self.representation.get_u8() << 7);
        type_value.encode(bytes);
        self.value_size.encode(bytes);
        bytes.push(&self.value[..self.value_size as usize]);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let type_value = u8::read(r)?;
        let representation = if type_value & 0x80 != 0 {
            SpdmDmtfMeasurementRepresentation::SpdmDmtfMeasurementRawBit
        } else {
            SpdmDmtfMeasurementRepresentation::SpdmDmtfMeasurementDigest
        };
        let r#type = SpdmDmtfMeasurementType::read(&mut Reader::init(&[type_value & 0x7f]))?;
        let value_size = u16::read(r)?;
        if value_size as usize > MAX_SPDM_MEASUREMENT_VALUE_LEN {
            return None;
        }
        let raw = r.take(value_size as usize)?;
        let mut value = [0u8; MAX_SPDM_MEASUREMENT_VALUE_LEN];
        value[..raw.len()].copy_from_slice(raw);
        Some(SpdmDmtfMeasurementStructure {
            r#type,
            representation,
            value_size,
            value,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmMeasurementBlockStructure {
    pub index: u8,
    pub measurement_specification: SpdmMeasurementSpecification,
    pub measurement_size: u16,
    pub measurement: SpdmDmtfMeasurementStructure,
}

impl Default for SpdmMeasurementBlockStructure {
    fn default() -> Self {
        SpdmMeasurementBlockStructure {
            index: 0,
            measurement_specification: SpdmMeasurementSpecification::empty(),
            measurement_size: 0,
            measurement: SpdmDmtfMeasurementStructure::default(),
        }
    }
}

impl Codec for SpdmMeasurementBlockStructure {
    fn encode(&self, bytes: &mut Writer) {
        self.index.encode(bytes);
        self.measurement_specification.encode(bytes);
        self.measurement_size.encode(bytes);
        self.measurement.encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let index = u8::read(r)?;
        let measurement_specification = SpdmMeasurementSpecification::read(r)?;
        let measurement_size = u16::read(r)?;
        let measurement = SpdmDmtfMeasurementStructure::read(r)?;
        Some(SpdmMeasurementBlockStructure {
            index,
            measurement_specification,
            measurement_size,
            measurement,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmMeasurementRecordStructure {
    pub number_of_blocks: u8,
    pub record: [SpdmMeasurementBlockStructure; MAX_SPDM_MEASUREMENT_BLOCK_COUNT],
}

impl Default for SpdmMeasurementRecordStructure {
    fn default() -> Self {
        SpdmMeasurementRecordStructure {
            number_of_blocks: 0,
            record: [SpdmMeasurementBlockStructure::default(); MAX_SPDM_MEASUREMENT_BLOCK_COUNT],
        }
    }
}

impl Codec for SpdmMeasurementRecordStructure {
    fn encode(&self, bytes: &mut Writer) {
        for block in self.record.iter().take(self.number_of_blocks as usize) {
            block.encode(bytes);
        }
    }
    fn read(r: &mut Reader) -> Option<Self> {
        // The number of blocks is conveyed out of band (the response's
        // `number_of_measurement` field covers the *total on the device*,
        // not necessarily how many are in this record); callers that know
        // how many blocks to expect should use `read_n` instead. This
        // fallback reads until the reader is exhausted.
        let mut out = SpdmMeasurementRecordStructure::default();
        let mut n = 0usize;
        while r.left() > 0 && n < MAX_SPDM_MEASUREMENT_BLOCK_COUNT {
            out.record[n] = SpdmMeasurementBlockStructure::read(r)?;
            n += 1;
        }
        out.number_of_blocks = n as u8;
        Some(out)
    }
}

impl SpdmMeasurementRecordStructure {
    pub fn read_n(r: &mut Reader, n: usize) -> Option<Self> {
        if n > MAX_SPDM_MEASUREMENT_BLOCK_COUNT {
            return None;
        }
        let mut out = SpdmMeasurementRecordStructure::default();
        for i in 0..n {
            out.record[i] = SpdmMeasurementBlockStructure::read(r)?;
        }
        out.number_of_blocks = n as u8;
        Some(out)
    }
}

pub fn gen_array_clone<T: Copy, const N: usize>(value: T, _n: usize) -> [T; N] {
    [value; N]
}
