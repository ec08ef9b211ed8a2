// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::{SpdmMeasurementRecordStructure, SpdmSignatureStruct};
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

pub const SPDM_MEASUREMENT_REQUEST_ALL: u8 = 0xFF;
pub const SPDM_MEASUREMENT_REQUEST_TOTAL_NUMBER: u8 = 0x0;

#[derive(Debug, Clone, Default)]
pub struct SpdmGetMeasurementsRequestPayload {
    pub measurement_attributes_signature_requested: bool,
    pub measurement_operation: u8,
    pub nonce: Option<[u8; 32]>,
    pub slot_id: u8,
}

impl SpdmCodec for SpdmGetMeasurementsRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        let param1 = if self.measurement_attributes_signature_requested {
            0x01u8
        } else {
            0x00u8
        };
        param1.encode(bytes);
        self.measurement_operation.encode(bytes); // param2
        if let Some(nonce) = self.nonce {
            bytes.push(&nonce);
            self.slot_id.encode(bytes);
        }
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let param1 = u8::read(r)?;
        let measurement_operation = u8::read(r)?;
        let measurement_attributes_signature_requested = param1 & 0x01 != 0;
        let (nonce, slot_id) = if measurement_attributes_signature_requested && r.left() > 0 {
            let nonce = <[u8; 32]>::read(r)?;
            let slot_id = u8::read(r)?;
            (Some(nonce), slot_id)
        } else {
            (None, 0)
        };
        Some(SpdmGetMeasurementsRequestPayload {
            measurement_attributes_signature_requested,
            measurement_operation,
            nonce,
            slot_id,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmMeasurementsResponsePayload {
    pub number_of_measurement: u8,
    pub slot_id: u8,
    pub measurement_record: SpdmMeasurementRecordStructure,
    pub nonce: [u8; 32],
    pub opaque: SpdmOpaqueStruct,
    pub signature: SpdmSignatureStruct,
}

impl SpdmCodec for SpdmMeasurementsResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.number_of_measurement.encode(bytes); // param1
        self.slot_id.encode(bytes); // param2
        let record_len = self
            .measurement_record
            .record
            .iter()
            .take(self.measurement_record.number_of_blocks as usize)
            .map(|b| {
                let mut scratch = [0u8; 1024];
                let mut w = Writer::init(&mut scratch);
                b.encode(&mut w);
                w.used()
            })
            .sum::<usize>();
        codec::U24(record_len as u32).encode(bytes);
        self.measurement_record.encode(bytes);
        bytes.push(&self.nonce);
        self.opaque.encode(bytes);
        self.signature.spdm_encode(context, bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let number_of_measurement = u8::read(r)?;
        let slot_id = u8::read(r)?;
        let record_len = codec::U24::read(r)?.0 as usize;
        let record_bytes = r.take(record_len)?;
        let mut record_reader = Reader::init(record_bytes);
        let measurement_record = SpdmMeasurementRecordStructure::read(&mut record_reader)?;
        let nonce = <[u8; 32]>::read(r)?;
        let opaque = SpdmOpaqueStruct::read(r)?;
        let signature = SpdmSignatureStruct::spdm_read(context, r)?;
        Some(SpdmMeasurementsResponsePayload {
            number_of_measurement,
            slot_id,
            measurement_record,
            nonce,
            opaque,
            signature,
        })
    }
}
