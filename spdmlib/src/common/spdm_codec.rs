// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Context-aware codec for payloads whose wire shape depends on the
//! negotiated algorithm suite (e.g. a digest field's length depends on
//! `base_hash_sel`). Plain `codec::Codec` is used for everything else.

use codec::{Reader, Writer};

use crate::common::SpdmContext;

pub trait SpdmCodec: Sized {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer);
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self>;
}
