// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod db;
pub mod models;
pub mod utils;
pub mod ledger;
pub mod reports;
pub mod fingerprint;
pub mod license;
pub mod session;
pub mod logging;
pub mod commands;
