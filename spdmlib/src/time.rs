// Copyright (c) 2022 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Thin shim over the host's sleep primitive, used by the RESPOND_IF_READY
//! backoff (§5 "Timeouts"). Kept as a single function so a `no_std` host can
//! swap it without touching the requester state machine.

#[cfg(feature = "std")]
pub fn sleep(microseconds: usize) {
    std::thread::sleep(std::time::Duration::from_micros(microseconds as u64));
}

#[cfg(not(feature = "std"))]
pub fn sleep(_microseconds: usize) {}
