// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::config::MAX_SPDM_CERT_CHAIN_DATA_SIZE;

#[derive(Debug, Clone, Default)]
pub struct SpdmGetCertificateRequestPayload {
    pub slot_id: u8,
    pub offset: u16,
    pub length: u16,
}

impl SpdmCodec for SpdmGetCertificateRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.offset.encode(bytes);
        self.length.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let slot_id = u8::read(r)?;
        u8::read(r)?;
        let offset = u16::read(r)?;
        let length = u16::read(r)?;
        Some(SpdmGetCertificateRequestPayload { slot_id, offset, length })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmCertificateResponsePayload {
    pub slot_id: u8,
    pub portion_length: u16,
    pub remainder_length: u16,
    pub cert_chain: Vec<u8>,
}

impl SpdmCodec for SpdmCertificateResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.portion_length.encode(bytes);
        self.remainder_length.encode(bytes);
        bytes.push(&self.cert_chain);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let slot_id = u8::read(r)?;
        u8::read(r)?;
        let portion_length = u16::read(r)?;
        let remainder_length = u16::read(r)?;
        if portion_length as usize > MAX_SPDM_CERT_CHAIN_DATA_SIZE {
            return None;
        }
        let cert_chain = r.take(portion_length as usize)?.to_vec();
        Some(SpdmCertificateResponsePayload {
            slot_id,
            portion_length,
            remainder_length,
            cert_chain,
        })
    }
}
