//! Compiles a rendered source file into a shared library the loader can
//! dlopen, under the strict warnings-as-errors profile (spec.md §4.8 step
//! 2). Grounded in the same `Command::new(compiler)` invocation style the
//! teacher's own compliance harness uses to shell out to `gcc`.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Compiler dialect used to build the shared library, distinct from
/// [`specgo_codegen::CompilerProfile`] (which only drives the syntax-only
/// gate check). Three variants per spec.md §4.8 step 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedLibraryProfile {
    GccClangUnix,
    DarwinDynamiclib,
    Msvc,
}

impl SharedLibraryProfile {
    pub fn detect(compiler: &str) -> Self {
        let lower = compiler.to_lowercase();
        if lower.contains("cl") && !lower.contains("clang") {
            SharedLibraryProfile::Msvc
        } else if cfg!(target_os = "macos") {
            SharedLibraryProfile::DarwinDynamiclib
        } else {
            SharedLibraryProfile::GccClangUnix
        }
    }
}

fn shared_library_filename(stem: &str, profile: SharedLibraryProfile) -> String {
    match profile {
        SharedLibraryProfile::Msvc => format!("{}.dll", stem),
        SharedLibraryProfile::DarwinDynamiclib => format!("lib{}.dylib", stem),
        SharedLibraryProfile::GccClangUnix => format!("lib{}.so", stem),
    }
}

/// Compile `source_path` into a shared library under `output_dir`, named
/// `stem` plus the profile's platform extension. Returns the library path
/// on success, or the compiler's stderr on failure.
pub fn compile_shared_library(
    compiler: &str,
    source_path: &Path,
    output_dir: &Path,
    stem: &str,
) -> Result<PathBuf, String> {
    let profile = SharedLibraryProfile::detect(compiler);
    let library_path = output_dir.join(shared_library_filename(stem, profile));

    let result = match profile {
        SharedLibraryProfile::GccClangUnix => Command::new(compiler)
            .arg("-std=c11")
            .arg("-Wall")
            .arg("-Wextra")
            .arg("-Werror")
            .arg("-shared")
            .arg("-fPIC")
            .arg("-o")
            .arg(&library_path)
            .arg(source_path)
            .output(),
        SharedLibraryProfile::DarwinDynamiclib => {
            let shared_attempt = Command::new(compiler)
                .arg("-std=c11")
                .arg("-Wall")
                .arg("-Wextra")
                .arg("-Werror")
                .arg("-shared")
                .arg("-fPIC")
                .arg("-o")
                .arg(&library_path)
                .arg(source_path)
                .output();

            match shared_attempt {
                Ok(out) if out.status.success() => Ok(out),
                _ => Command::new(compiler)
                    .arg("-std=c11")
                    .arg("-Wall")
                    .arg("-Wextra")
                    .arg("-Werror")
                    .arg("-dynamiclib")
                    .arg("-o")
                    .arg(&library_path)
                    .arg(source_path)
                    .output(),
            }
        }
        SharedLibraryProfile::Msvc => Command::new(compiler)
            .arg("/LD")
            .arg("/WX")
            .arg(source_path)
            .arg(format!("/Fe{}", library_path.display()))
            .current_dir(output_dir)
            .output(),
    };

    match result {
        Ok(output) if output.status.success() => Ok(library_path),
        Ok(output) => Err(String::from_utf8_lossy(&output.stderr).to_string()),
        Err(e) => Err(format!("failed to invoke compiler `{}`: {}", compiler, e)),
    }
}

/// `true` if `compiler` can be invoked at all (spec.md §7 ConfigurationError
/// "compiler not found").
pub fn compiler_is_resolvable(compiler: &str) -> bool {
    Command::new(compiler)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
