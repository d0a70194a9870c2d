// Quarry's Utilities Module
//
// Path normalization and file classification helpers shared by the scanner,
// the staleness detector and the search engine.

pub mod paths;

/// File classification by extension
pub mod language {
    use std::path::Path;

    /// Detect the language tag used to pick an analyzer
    pub fn detect_language(path: &Path) -> Option<&'static str> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
                "rs" => Some("rust"),
                "py" => Some("python"),
                "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
                "ts" | "tsx" => Some("typescript"),
                "go" => Some("go"),
                "java" => Some("java"),
                "c" | "h" => Some("c"),
                "cpp" | "cc" | "cxx" | "hpp" | "hxx" => Some("cpp"),
                "cs" => Some("csharp"),
                "php" => Some("php"),
                "rb" => Some("ruby"),
                "swift" => Some("swift"),
                "kt" | "kts" => Some("kotlin"),
                "scala" => Some("scala"),
                "lua" => Some("lua"),
                "zig" => Some("zig"),
                "dart" => Some("dart"),
                "sh" | "bash" | "zsh" => Some("bash"),
                "sql" => Some("sql"),
                "md" | "markdown" => Some("markdown"),
                "json" => Some("json"),
                "toml" => Some("toml"),
                "yml" | "yaml" => Some("yaml"),
                "html" | "htm" => Some("html"),
                "css" | "scss" => Some("css"),
                _ => None,
            })
    }

    /// Source-code extensions that earn the ranking boost over markup, config and docs
    pub fn is_source_extension(path: &str) -> bool {
        let ext = match path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => {
                ext.to_ascii_lowercase()
            }
            _ => return false,
        };

        matches!(
            ext.as_str(),
            "rs" | "go"
                | "py"
                | "js"
                | "jsx"
                | "mjs"
                | "ts"
                | "tsx"
                | "java"
                | "c"
                | "h"
                | "cpp"
                | "cc"
                | "cxx"
                | "hpp"
                | "cs"
                | "php"
                | "rb"
                | "swift"
                | "kt"
                | "kts"
                | "scala"
                | "lua"
                | "zig"
                | "dart"
                | "sh"
                | "bash"
                | "sql"
        )
    }

    /// Binary formats are never discovered for indexing
    pub fn is_binary_extension(path: &Path) -> bool {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return false,
        };

        matches!(
            ext.as_str(),
            // Executables and libraries
            "exe" | "dll" | "so" | "dylib" | "lib" | "a" | "o" | "obj" | "pdb" | "class" | "wasm" |
            // Archives
            "zip" | "tar" | "gz" | "bz2" | "xz" | "7z" | "rar" | "jar" |
            // Media files
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "ico" | "webp" |
            "mp3" | "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" | "mkv" |
            // Database files
            "db" | "sqlite" | "sqlite3" | "mdf" | "ldf" | "bak" |
            // Other binary formats
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "ttf" | "woff" | "woff2"
        )
    }

}
