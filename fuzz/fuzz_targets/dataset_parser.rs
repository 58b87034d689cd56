#![no_main]

use aa_pitfalls::dataset::{parse_dataset, ColumnRef, LoadOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Header-named and index-addressed layouts must both parse without panicking
        let _ = parse_dataset(input, &LoadOptions::default());
        let _ = parse_dataset(
            input,
            &LoadOptions {
                delimiter: ';',
                has_header: false,
                user_column: ColumnRef::Index(0),
                impression_column: ColumnRef::Index(1),
                click_column: ColumnRef::Index(2),
            },
        );
    }
});
