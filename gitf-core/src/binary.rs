use std::path::Path;

/// Extensions never captured by checkpoints or picked up when expanding
/// directory and glob arguments.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "lib", "obj", "pdb", "ifc", "ddi", "ilk", "exp", "embed", "so", "a", "pch",
    "ttf", "ttc", "bin",
];

/// Decides by extension only; file contents are never inspected.
pub fn is_binary_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|binary| binary.eq_ignore_ascii_case(ext))
        })
}
