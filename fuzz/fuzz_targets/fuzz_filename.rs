// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use archivist::naming::{output_filename, sanitize_filename, FORBIDDEN_CHARS};

#[derive(Arbitrary, Debug)]
struct Fields {
    date: String,
    source: String,
    destination: String,
    description: String,
}

fuzz_target!(|f: Fields| {
    let name = output_filename(&f.date, &f.source, &f.destination, &f.description);

    assert!(!name.contains(FORBIDDEN_CHARS));
    assert!(name.ends_with(".pdf"));
    assert_eq!(sanitize_filename(&name), name);
});
