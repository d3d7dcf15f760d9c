//! Audio acquisition for oscope.
//!
//! Everything between the platform audio API and the renderer: format
//! negotiation, the device byte stream, PCM decoding, sample history,
//! and the pipeline state machine tying them together.

pub mod buffer;
pub mod decode;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod source;

pub use buffer::Retention;
pub use error::CaptureError;
pub use format::CaptureFormat;
pub use pipeline::Pipeline;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Temporarily redirects stderr to /dev/null to suppress ALSA library
/// warnings on Linux. The warnings come from the cpal backend and do not
/// indicate actual errors. On other platforms this is a no-op.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_stderr<F, T, E>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let dev_null = match OpenOptions::new().write(true).open("/dev/null") {
        Ok(file) => file,
        // Without /dev/null just run unsuppressed.
        Err(_) => return f(),
    };
    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return f();
    }

    if unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_stderr<F, T, E>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    f()
}
