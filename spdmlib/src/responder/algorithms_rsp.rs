// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::algo::{
    SpdmAeadAlgo, SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmKeyScheduleAlgo, SpdmMeasurementHashAlgo,
    SpdmMeasurementSpecification, SpdmReqAsymAlgo,
};
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::algorithm::select_highest_priority;
use crate::message::*;
use crate::responder::ResponderContext;

pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmNegotiateAlgorithmsRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::AfterCapabilities {
        return spdm_result_err!(UnexpectedRequest);
    }

    let measurement_specification_sel = select_highest_priority(
        &[SpdmMeasurementSpecification::DMTF],
        ctx.common.config_info.measurement_specification,
        request.measurement_specification,
    )
    .unwrap_or(SpdmMeasurementSpecification::empty());

    let base_hash_sel = select_highest_priority(
        &[
            SpdmBaseHashAlgo::TPM_ALG_SHA_512,
            SpdmBaseHashAlgo::TPM_ALG_SHA_384,
            SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        ],
        ctx.common.config_info.base_hash_algo,
        request.base_hash_algo,
    )
    .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;

    let base_asym_sel = select_highest_priority(
        &[
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
            SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048,
        ],
        ctx.common.config_info.base_asym_algo,
        request.base_asym_algo,
    )
    .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;

    let dhe_sel = select_highest_priority(
        &[SpdmDheAlgo::SECP_384_R1, SpdmDheAlgo::SECP_256_R1, SpdmDheAlgo::FFDHE_3072],
        ctx.common.config_info.dhe_algo,
        request.dhe_algo,
    )
    .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;

    let aead_sel = select_highest_priority(
        &[SpdmAeadAlgo::AES_256_GCM, SpdmAeadAlgo::CHACHA20_POLY1305, SpdmAeadAlgo::AES_128_GCM],
        ctx.common.config_info.aead_algo,
        request.aead_algo,
    )
    .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;

    let req_asym_sel = select_highest_priority(
        &[SpdmReqAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384, SpdmReqAsymAlgo::TPM_ALG_RSAPSS_2048],
        ctx.common.config_info.req_asym_algo,
        request.req_asym_algo,
    )
    .unwrap_or(SpdmReqAsymAlgo::empty());

    let key_schedule_sel = select_highest_priority(
        &[SpdmKeyScheduleAlgo::SPDM_KEY_SCHEDULE],
        ctx.common.config_info.key_schedule_algo,
        request.key_schedule_algo,
    )
    .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;

    // Unlike the other categories, MeasurementHashAlgo is not something the
    // requester offers a candidate set for (spec §4.7) — it is simply the
    // responder's local choice, gated on measurement support having been
    // negotiated at all.
    let measurement_hash_sel = if measurement_specification_sel.is_empty() {
        SpdmMeasurementHashAlgo::empty()
    } else {
        ctx.common.config_info.measurement_hash_algo
    };

    ctx.common.negotiate_info.measurement_specification_sel = measurement_specification_sel;
    ctx.common.negotiate_info.measurement_hash_sel = measurement_hash_sel;
    ctx.common.negotiate_info.base_hash_sel = base_hash_sel;
    ctx.common.negotiate_info.base_asym_sel = base_asym_sel;
    ctx.common.negotiate_info.dhe_sel = dhe_sel;
    ctx.common.negotiate_info.aead_sel = aead_sel;
    ctx.common.negotiate_info.req_asym_sel = req_asym_sel;
    ctx.common.negotiate_info.key_schedule_sel = key_schedule_sel;

    let response = SpdmAlgorithmsResponsePayload {
        measurement_specification_sel,
        measurement_hash_algo: measurement_hash_sel,
        base_asym_sel,
        base_hash_sel,
        dhe_sel,
        aead_sel,
        req_asym_sel,
        key_schedule_sel,
    };
    let encoded = ctx.encode(
        SpdmMessagePayload::SpdmAlgorithmsResponse(response),
        SpdmRequestResponseCode::SpdmResponseAlgorithms,
    );

    ctx.common.transcript.append(TranscriptScope::Vca, raw_request)?;
    ctx.common.transcript.append(TranscriptScope::Vca, &encoded)?;
    ctx.common.runtime_info.connection_state = SpdmConnectionState::Negotiated;
    Ok(encoded)
}
