// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod currency;
pub mod doctor;
pub mod erase;
pub mod transactions;

use crate::error::LedgerError;

/// Engine errors cross the CLI boundary as status + message.
pub(crate) fn to_cli(err: LedgerError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}]", err, err.status())
}
