// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! HEARTBEAT carries no payload beyond the two reserved header bytes; see
//! `SpdmMessagePayload::SpdmHeartbeatRequest`/`SpdmHeartbeatResponse` in
//! `message::mod`, which encode and decode it inline.
