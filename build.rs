//! Build script: embeds the git hash and pre-checks GPU toolkits.
//!
//! The toolkit checks run before whisper-rs-sys compiles, so a missing
//! CUDA or ROCm install fails with install instructions instead of a
//! wall of C++ errors.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        check_cuda();
    }
    if cfg!(feature = "vulkan") {
        check_vulkan();
    }
    if cfg!(feature = "hipblas") {
        check_rocm();
    }
    if cfg!(feature = "openblas") {
        check_openblas();
    }
}

fn check_cuda() {
    let output = Command::new("nvcc").arg("--version").output();
    match output {
        Ok(out) if out.status.success() => {
            let text = String::from_utf8_lossy(&out.stdout);
            match parse_cuda_version(&text) {
                Some((major, minor)) => {
                    println!("cargo::warning=CUDA toolkit {}.{} detected", major, minor);
                }
                None => {
                    println!("cargo::warning=CUDA toolkit detected (version unknown)");
                }
            }
            if let Some(driver_cuda) = driver_cuda_version() {
                println!(
                    "cargo::warning=NVIDIA driver supports up to CUDA {}",
                    driver_cuda
                );
            }
            println!(
                "cargo::warning=If the build fails with 'Unsupported gpu architecture', update the toolkit: https://developer.nvidia.com/cuda-downloads"
            );
        }
        _ => {
            panic!(
                "\n`nvcc` not found: the CUDA toolkit is not installed.\n\
                 Install it from https://developer.nvidia.com/cuda-downloads\n\
                 or build without CUDA: cargo build --release\n"
            );
        }
    }
}

/// Parse "release X.Y" from nvcc --version output.
fn parse_cuda_version(text: &str) -> Option<(u32, u32)> {
    // nvcc output: "Cuda compilation tools, release 12.4, V12.4.131"
    let after = text.split("release ").nth(1)?;
    let version_str = after.split(',').next()?;
    let (major, minor) = version_str.split_once('.')?;
    Some((major.trim().parse().ok()?, minor.trim().parse().ok()?))
}

/// CUDA version the installed driver supports, from the nvidia-smi header.
fn driver_cuda_version() -> Option<String> {
    let output = Command::new("nvidia-smi").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);

    // Header line shows "CUDA Version: X.Y"
    let after = text.split("CUDA Version:").nth(1)?;
    let version: String = after
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if version.is_empty() { None } else { Some(version) }
}

fn check_vulkan() {
    if Command::new("vulkaninfo")
        .arg("--summary")
        .output()
        .is_err()
    {
        panic!(
            "\n`vulkaninfo` not found: the Vulkan SDK is not installed.\n\
             Install it from https://vulkan.lunarg.com/\n\
             or build without Vulkan: cargo build --release\n"
        );
    }
    println!("cargo::warning=Vulkan SDK detected");
}

fn check_rocm() {
    if Command::new("rocminfo").output().is_err() {
        panic!(
            "\n`rocminfo` not found: ROCm is not installed.\n\
             Install it from https://rocm.docs.amd.com/\n\
             or build without HipBLAS: cargo build --release\n"
        );
    }
    println!("cargo::warning=ROCm detected");
}

fn check_openblas() {
    // Check for libopenblas via pkg-config or known install paths
    let pkg_config_ok = Command::new("pkg-config")
        .args(["--exists", "openblas"])
        .status()
        .is_ok_and(|s| s.success());

    if !pkg_config_ok {
        let lib_exists = [
            "/usr/lib/x86_64-linux-gnu/libopenblas.so",
            "/usr/lib/libopenblas.so",
            "/usr/lib64/libopenblas.so",
        ]
        .iter()
        .any(|p| std::path::Path::new(p).exists());

        if !lib_exists {
            panic!(
                "\nOpenBLAS not found.\n\
                 Install it with: sudo apt install libopenblas-dev\n\
                 or build without OpenBLAS: cargo build --release\n"
            );
        }
    }
    println!("cargo::warning=OpenBLAS detected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cuda_version_standard() {
        let text = "nvcc: NVIDIA (R) Cuda compiler driver\n\
                    Copyright (c) 2005-2025 NVIDIA Corporation\n\
                    Built on Tue_Feb_27_16:19:38_PST_2025\n\
                    Cuda compilation tools, release 12.4, V12.4.131\n\
                    Build cuda_12.4.r12.4/compiler.34097967_0";
        assert_eq!(parse_cuda_version(text), Some((12, 4)));
    }

    #[test]
    fn parse_cuda_version_13() {
        let text = "Cuda compilation tools, release 13.0, V13.0.76";
        assert_eq!(parse_cuda_version(text), Some((13, 0)));
    }

    #[test]
    fn parse_cuda_version_no_match() {
        assert_eq!(parse_cuda_version("no version here"), None);
    }

    #[test]
    fn parse_cuda_version_no_minor() {
        assert_eq!(parse_cuda_version("release 12, V12"), None);
    }

    #[test]
    fn parse_cuda_version_partial() {
        assert_eq!(parse_cuda_version("release abc, V1"), None);
    }
}
