use std::fmt::Write;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // Too slow to evaluate as a const fn, and generating it here means it's only built once
    let out_dir = std::env::var_os("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let path = std::path::Path::new(&out_dir).join("hex.rs");
    let mut rows = String::new();
    for high in 0..=u8::MAX {
        let row: Vec<String> = (0..=u8::MAX)
            .map(|low| (hex_digit(high) << 4 | hex_digit(low)).to_string())
            .collect();
        writeln!(rows, "    [{}],", row.join(", ")).unwrap();
    }
    let table = format!(
        "/// Value of every pair of ASCII hex digits, indexed by the two characters\n\
         pub const HEX_PAIRS: [[u8; 256]; 256] = [\n{rows}];\n"
    );
    std::fs::write(&path, table).expect("couldn't write the hex lookup table");
}

/// Anything which isn't a hex digit counts as zero
fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        b'a'..=b'f' => c - b'a' + 10,
        _ => 0,
    }
}
