//! Best-effort normalization of the native header text.
//!
//! The vendored `wgpu.h` carries preprocessor lines that the declaration
//! consumers here have no use for (and that upstream keeps reshuffling).
//! This is a textual filter, not a C parser: if upstream changes its header
//! syntax in incompatible ways, fidelity is lost silently.

/// Line prefixes dropped by [`normalize`].
pub const STRIPPED_PREFIXES: [&str; 6] = [
    "#include ",
    "#define WGPU_LOCAL",
    "#define WGPUColor",
    "#define WGPUOrigin3d_ZERO",
    "#if defined",
    "#endif",
];

/// Strips the preprocessor lines the declaration consumers stumble on.
///
/// Idempotent: normalizing already-normalized text is a no-op.
pub fn normalize(header: &str) -> String {
    let mut declarations = String::with_capacity(header.len());
    for line in header.lines() {
        if STRIPPED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            continue;
        }
        declarations.push_str(line);
        declarations.push('\n');
    }
    declarations
}

/// Scans declaration text for `wgpu_*` function names, in declaration order.
///
/// Heuristic: an identifier starting with `wgpu_` directly followed by an
/// opening parenthesis (whitespace allowed). Good enough for the vendored
/// header; duplicates are dropped.
pub fn function_names(declarations: &str) -> Vec<&str> {
    let bytes = declarations.as_bytes();
    let mut names: Vec<&str> = Vec::new();
    let mut search_from = 0;

    while let Some(found) = declarations[search_from..].find("wgpu_") {
        let start = search_from + found;

        // Reject matches inside a longer identifier, e.g. `my_wgpu_thing`.
        if start > 0 && is_ident_byte(bytes[start - 1]) {
            search_from = start + 1;
            continue;
        }

        let mut end = start;
        while end < bytes.len() && is_ident_byte(bytes[end]) {
            end += 1;
        }

        let mut after = end;
        while after < bytes.len() && bytes[after].is_ascii_whitespace() {
            after += 1;
        }

        if after < bytes.len() && bytes[after] == b'(' {
            let name = &declarations[start..end];
            if !names.contains(&name) {
                names.push(name);
            }
        }

        search_from = end;
    }

    names
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
