// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::SpdmDigestStruct;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::config::MAX_SPDM_CERT_CHAIN_SLOT_COUNT;

#[derive(Debug, Clone, Default)]
pub struct SpdmDigestsResponsePayload {
    pub slot_mask: u8,
    pub digests: Vec<SpdmDigestStruct>,
}

impl SpdmCodec for SpdmDigestsResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        self.slot_mask.encode(bytes); // param2
        for digest in &self.digests {
            digest.spdm_encode(context, bytes);
        }
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        let slot_mask = u8::read(r)?;
        let mut digests = Vec::new();
        for slot in 0..MAX_SPDM_CERT_CHAIN_SLOT_COUNT {
            if slot_mask & (1 << slot) != 0 {
                digests.push(SpdmDigestStruct::spdm_read(context, r)?);
            }
        }
        Some(SpdmDigestsResponsePayload { slot_mask, digests })
    }
}
