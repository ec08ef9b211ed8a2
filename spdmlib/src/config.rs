// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Fixed size limits. The core favors stack buffers sized by these
//! constants over dynamic allocation, matching the teacher's embedded-first
//! style; a host targeting a richer environment may raise them freely.

pub const MAX_SPDM_MSG_SIZE: usize = 0x1200;
pub const MAX_SPDM_TRANSPORT_SIZE: usize = MAX_SPDM_MSG_SIZE + 64;
pub const DATA_TRANSFER_SIZE: usize = MAX_SPDM_TRANSPORT_SIZE;

pub const MAX_SPDM_CERT_CHAIN_DATA_SIZE: usize = 0x1000;
pub const MAX_SPDM_CERT_CHAIN_SLOT_COUNT: usize = 8;

pub const MAX_SPDM_MEASUREMENT_BLOCK_COUNT: usize = 16;
pub const MAX_SPDM_MEASUREMENT_VALUE_LEN: usize = 64;
pub const MAX_SPDM_MEASUREMENT_RECORD_SIZE: usize = 0x400;

pub const MAX_SPDM_OPAQUE_SIZE: usize = 1024;
pub const MAX_SPDM_PSK_HINT_SIZE: usize = 32;
pub const MAX_SPDM_PSK_CONTEXT_SIZE: usize = 64;

pub const MAX_SPDM_SESSION_COUNT: usize = 4;
pub const MAX_SPDM_SESSION_SEQUENCE_NUMBER_COUNT: usize = 8;

pub const SPDM_MAX_HASH_SIZE: usize = 64;
pub const SPDM_MAX_ASYM_KEY_SIZE: usize = 512;
pub const SPDM_MAX_DHE_KEY_SIZE: usize = 512;
pub const SPDM_MAX_AEAD_KEY_SIZE: usize = 32;
pub const SPDM_MAX_AEAD_IV_SIZE: usize = 12;
pub const SPDM_NONCE_SIZE: usize = 32;
pub const SPDM_MAX_RANDOM_COUNT: u16 = 32;

/// Sequence numbers are fatal to exhaust; `u64::MAX` is the terminal value
/// per spec §3 (2^64 - 1 is reserved as the "exhausted" sentinel).
pub const MAX_SESSION_SEQUENCE_NUMBER: u64 = u64::MAX;
