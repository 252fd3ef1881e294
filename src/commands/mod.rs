// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod license;
pub mod transactions;
pub mod categories;
pub mod dashboard;
pub mod reports;
pub mod tax;
pub mod exporter;
