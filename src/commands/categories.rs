// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxType;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let types = match m.get_one::<String>("type") {
        Some(t) => vec![t.parse::<TxType>()?],
        None => vec![TxType::Income, TxType::Expense],
    };
    let mut data = Vec::new();
    for ty in types {
        for name in ty.categories() {
            data.push(vec![ty.to_string(), name.to_string()]);
        }
    }
    println!("{}", pretty_table(&["Type", "Category"], data));
    Ok(())
}
