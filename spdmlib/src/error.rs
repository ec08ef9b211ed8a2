// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Error kinds the core distinguishes (spec §7) and the disposition each one
//! carries. Every fallible core operation returns `SpdmResult<T>`.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmStatus {
    /// Malformed PDU or field out of range.
    InvalidRequest,
    /// Capability not negotiated on one or both sides.
    UnsupportedRequest,
    /// Request code not admitted by the current state.
    UnexpectedRequest,
    /// No protocol version in common.
    VersionMismatch,
    /// Responder is deferring the response.
    Busy,
    /// Responder needs more time; retry via RESPOND_IF_READY.
    NotReady,
    /// Responder wants the requester to restart negotiation.
    RequestResynch,
    /// Signature, HMAC, or certificate-chain validation failed.
    SecurityViolation,
    /// AEAD tag verification failed.
    DecryptError,
    /// The transport reported a send/receive failure.
    TransportError,
    /// An invariant the core relies on was broken; this is a bug.
    InternalError,
}

impl fmt::Display for SpdmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpdmStatus::InvalidRequest => "invalid request",
            SpdmStatus::UnsupportedRequest => "unsupported request",
            SpdmStatus::UnexpectedRequest => "unexpected request",
            SpdmStatus::VersionMismatch => "version mismatch",
            SpdmStatus::Busy => "busy",
            SpdmStatus::NotReady => "not ready",
            SpdmStatus::RequestResynch => "request resynch",
            SpdmStatus::SecurityViolation => "security violation",
            SpdmStatus::DecryptError => "decrypt error",
            SpdmStatus::TransportError => "transport error",
            SpdmStatus::InternalError => "internal error",
        };
        f.write_str(s)
    }
}

pub type SpdmResult<T = ()> = Result<T, SpdmStatus>;

/// Builds an `SpdmStatus` value, logging the call site at error level.
#[macro_export]
macro_rules! spdm_err {
    ($kind:ident) => {{
        log::error!("spdm error: {} at {}:{}", stringify!($kind), file!(), line!());
        $crate::error::SpdmStatus::$kind
    }};
}

/// Builds an `Err(SpdmStatus)` of the given kind.
#[macro_export]
macro_rules! spdm_result_err {
    ($kind:ident) => {
        Err($crate::spdm_err!($kind))
    };
}
