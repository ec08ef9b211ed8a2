// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::{
    SpdmAeadAlgo, SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmKeyScheduleAlgo,
    SpdmMeasurementHashAlgo, SpdmMeasurementSpecification, SpdmReqAsymAlgo,
};
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

#[derive(Debug, Clone, Default)]
pub struct SpdmNegotiateAlgorithmsRequestPayload {
    pub measurement_specification: SpdmMeasurementSpecification,
    pub base_asym_algo: SpdmBaseAsymAlgo,
    pub base_hash_algo: SpdmBaseHashAlgo,
    pub dhe_algo: SpdmDheAlgo,
    pub aead_algo: SpdmAeadAlgo,
    pub req_asym_algo: SpdmReqAsymAlgo,
    pub key_schedule_algo: SpdmKeyScheduleAlgo,
}

impl SpdmCodec for SpdmNegotiateAlgorithmsRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1: ext_asym_count + ext_hash_count carried as 0 here
        0u8.encode(bytes); // param2
        self.measurement_specification.encode(bytes);
        0u8.encode(bytes); // reserved
        self.base_asym_algo.encode(bytes);
        self.base_hash_algo.encode(bytes);
        self.dhe_algo.encode(bytes);
        self.aead_algo.encode(bytes);
        self.req_asym_algo.encode(bytes);
        self.key_schedule_algo.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        let measurement_specification = SpdmMeasurementSpecification::read(r)?;
        u8::read(r)?;
        let base_asym_algo = SpdmBaseAsymAlgo::read(r)?;
        let base_hash_algo = SpdmBaseHashAlgo::read(r)?;
        let dhe_algo = SpdmDheAlgo::read(r)?;
        let aead_algo = SpdmAeadAlgo::read(r)?;
        let req_asym_algo = SpdmReqAsymAlgo::read(r)?;
        let key_schedule_algo = SpdmKeyScheduleAlgo::read(r)?;
        Some(SpdmNegotiateAlgorithmsRequestPayload {
            measurement_specification,
            base_asym_algo,
            base_hash_algo,
            dhe_algo,
            aead_algo,
            req_asym_algo,
            key_schedule_algo,
        })
    }
}

/// The Responder's picks — exactly one bit set per category once
/// negotiation succeeds (spec §4.7 "Algorithm negotiation").
#[derive(Debug, Clone, Default)]
pub struct SpdmAlgorithmsResponsePayload {
    pub measurement_specification_sel: SpdmMeasurementSpecification,
    pub measurement_hash_algo: SpdmMeasurementHashAlgo,
    pub base_asym_sel: SpdmBaseAsymAlgo,
    pub base_hash_sel: SpdmBaseHashAlgo,
    pub dhe_sel: SpdmDheAlgo,
    pub aead_sel: SpdmAeadAlgo,
    pub req_asym_sel: SpdmReqAsymAlgo,
    pub key_schedule_sel: SpdmKeyScheduleAlgo,
}

impl SpdmCodec for SpdmAlgorithmsResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.measurement_specification_sel.encode(bytes);
        0u8.encode(bytes); // reserved
        self.measurement_hash_algo.encode(bytes);
        self.base_asym_sel.encode(bytes);
        self.base_hash_sel.encode(bytes);
        self.dhe_sel.encode(bytes);
        self.aead_sel.encode(bytes);
        self.req_asym_sel.encode(bytes);
        self.key_schedule_sel.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        let measurement_specification_sel = SpdmMeasurementSpecification::read(r)?;
        u8::read(r)?;
        let measurement_hash_algo = SpdmMeasurementHashAlgo::read(r)?;
        let base_asym_sel = SpdmBaseAsymAlgo::read(r)?;
        let base_hash_sel = SpdmBaseHashAlgo::read(r)?;
        let dhe_sel = SpdmDheAlgo::read(r)?;
        let aead_sel = SpdmAeadAlgo::read(r)?;
        let req_asym_sel = SpdmReqAsymAlgo::read(r)?;
        let key_schedule_sel = SpdmKeyScheduleAlgo::read(r)?;
        Some(SpdmAlgorithmsResponsePayload {
            measurement_specification_sel,
            measurement_hash_algo,
            base_asym_sel,
            base_hash_sel,
            dhe_sel,
            aead_sel,
            req_asym_sel,
            key_schedule_sel,
        })
    }
}

/// Picks the responder's highest-priority algorithm present in both the
/// local supported set and the peer's advertised set (spec §4.7).
pub fn select_highest_priority<T: Copy + PartialEq>(priority_order: &[T], local: T, peer: T) -> Option<T>
where
    T: core::ops::BitAnd<Output = T> + PartialEq,
{
    for candidate in priority_order {
        if (*candidate & local) == *candidate && (*candidate & peer) == *candidate {
            return Some(*candidate);
        }
    }
    None
}
