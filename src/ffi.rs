//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `boleto_render_*` are allocated on the Rust heap.
//! - Callers **must** free them with `boleto_free_buffer`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error):
//!   1 null pointer, 2 invalid UTF-8, 3 invalid slip JSON, 4 render failure.
//! - Error details can be retrieved via `boleto_last_error`.
//!
//! ## Input
//! Slips are passed as JSON matching [`SlipRecord`]; batches as a JSON array.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::config::{RenderConfig, RenderOptions};
use crate::pipeline::Composer;
use crate::slip::SlipRecord;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Optional per-call settings for the `boleto_render_*` functions.
///
/// `NULL` strings and a `0` resolution fall back to the defaults
/// (`BOLETO_*` environment variables, then pdf / 150 dpi / bundled template).
#[repr(C)]
pub struct BoletoRenderOptions {
    /// Null-terminated output format identifier (`pdf`, `png`, `jpg`, `json`).
    pub format: *const c_char,
    /// Raster resolution in dpi.
    pub resolution: u32,
    /// Null-terminated path of the template artwork.
    pub template_path: *const c_char,
}

/// Convert optional C strings into Rust values.
///
/// # Safety
/// `ptr`, if non-null, must point to a valid null-terminated string.
unsafe fn opt_string(ptr: *const c_char) -> Result<Option<String>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_string()))
        .map_err(|e| format!("Invalid UTF-8 in option: {e}"))
}

/// # Safety
/// `opts`, if non-null, must point to a valid [`BoletoRenderOptions`].
unsafe fn composer_and_options(
    opts: *const BoletoRenderOptions,
) -> Result<(Composer, RenderOptions), String> {
    let mut config = RenderConfig::from_env().map_err(|e| e.to_string())?;
    let mut options = RenderOptions::default();

    if let Some(opts) = opts.as_ref() {
        options.format = opt_string(opts.format)?;
        if opts.resolution != 0 {
            options.resolution = Some(opts.resolution);
        }
        if let Some(path) = opt_string(opts.template_path)? {
            config = config.with_template(path);
        }
    }
    Ok((Composer::new(config), options))
}

/// # Safety
/// `json_ptr` must point to `json_len` valid bytes.
unsafe fn read_json<'a>(json_ptr: *const u8, json_len: u32) -> Result<&'a str, c_int> {
    let bytes = slice::from_raw_parts(json_ptr, json_len as usize);
    std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        2
    })
}

/// # Safety
/// `out_buf` and `out_len` must be valid pointers.
unsafe fn hand_over(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) -> c_int {
    let len = bytes.len() as u32;
    let raw = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    *out_buf = raw;
    *out_len = len;
    0
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Render a single slip given as JSON.
///
/// # Parameters
/// - `json_ptr`, `json_len`: UTF-8 JSON object (not necessarily null-terminated)
/// - `opts`: optional settings, may be `NULL`
/// - `out_buf`, `out_len`: on success, receive the rendered stream
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `opts` must be `NULL` or point to a valid [`BoletoRenderOptions`].
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `boleto_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn boleto_render_json(
    json_ptr: *const u8,
    json_len: u32,
    opts: *const BoletoRenderOptions,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }
    let json = match read_json(json_ptr, json_len) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let slip = match SlipRecord::from_json(json) {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid slip JSON: {e}"));
            return 3;
        }
    };
    let (composer, options) = match composer_and_options(opts) {
        Ok(pair) => pair,
        Err(e) => {
            set_last_error(&e);
            return 4;
        }
    };

    match composer.render(&slip, &options) {
        Ok(bytes) => hand_over(bytes, out_buf, out_len),
        Err(e) => {
            set_last_error(&e.to_string());
            4
        }
    }
}

/// Render a JSON array of slips into one multi-page stream.
///
/// # Safety
/// Same as `boleto_render_json`.
#[no_mangle]
pub unsafe extern "C" fn boleto_render_batch_json(
    json_ptr: *const u8,
    json_len: u32,
    opts: *const BoletoRenderOptions,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }
    let json = match read_json(json_ptr, json_len) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let slips = match SlipRecord::batch_from_json(json) {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid slip JSON: {e}"));
            return 3;
        }
    };
    let (composer, options) = match composer_and_options(opts) {
        Ok(pair) => pair,
        Err(e) => {
            set_last_error(&e);
            return 4;
        }
    };

    match composer.render_batch(&slips, &options) {
        Ok(bytes) => hand_over(bytes, out_buf, out_len),
        Err(e) => {
            set_last_error(&e.to_string());
            4
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a buffer returned by `boleto_render_json` or `boleto_render_batch_json`.
///
/// # Safety
/// `buf` must have been returned by one of those calls, and `len` must be the
/// corresponding length.
#[no_mangle]
pub unsafe extern "C" fn boleto_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `boleto_*` call on the same
/// thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn boleto_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn boleto_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::{sample_batch, sample_slip};

    fn options(format: &CString, template: &CString) -> BoletoRenderOptions {
        BoletoRenderOptions {
            format: format.as_ptr(),
            resolution: 0,
            template_path: template.as_ptr(),
        }
    }

    fn last_error() -> String {
        let ptr = boleto_last_error();
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn ffi_render_single_layout() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let template = CString::new(file.path().to_str().unwrap()).unwrap();
        let format = CString::new("json").unwrap();
        let opts = options(&format, &template);
        let json = serde_json::to_vec(&sample_slip()).unwrap();

        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe {
            boleto_render_json(
                json.as_ptr(),
                json.len() as u32,
                &opts,
                &mut out_buf,
                &mut out_len,
            )
        };

        assert_eq!(rc, 0, "Expected success");
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(bytes[0], b'{');
        unsafe { boleto_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_render_batch_layout() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let template = CString::new(file.path().to_str().unwrap()).unwrap();
        let format = CString::new("json").unwrap();
        let opts = options(&format, &template);
        let json = serde_json::to_vec(&sample_batch(3)).unwrap();

        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe {
            boleto_render_batch_json(
                json.as_ptr(),
                json.len() as u32,
                &opts,
                &mut out_buf,
                &mut out_len,
            )
        };

        assert_eq!(rc, 0);
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        let dump: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(dump["pages"].as_array().unwrap().len(), 3);
        unsafe { boleto_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_null_template_uses_bundled_artwork() {
        let format = CString::new("pdf").unwrap();
        let opts = BoletoRenderOptions {
            format: format.as_ptr(),
            resolution: 0,
            template_path: ptr::null(),
        };
        let json = serde_json::to_vec(&sample_slip()).unwrap();

        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe {
            boleto_render_json(
                json.as_ptr(),
                json.len() as u32,
                &opts,
                &mut out_buf,
                &mut out_len,
            )
        };

        assert_eq!(rc, 0);
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert!(bytes.starts_with(b"%PDF-"));
        unsafe { boleto_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_null_input() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe {
            boleto_render_json(
                ptr::null(),
                0,
                ptr::null(),
                &mut out_buf,
                &mut out_len,
            )
        };
        assert_eq!(rc, 1);
        assert_eq!(last_error(), "Null pointer argument");
    }

    #[test]
    fn ffi_invalid_json() {
        let json = b"{\"document_number\": 1";
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe {
            boleto_render_json(
                json.as_ptr(),
                json.len() as u32,
                ptr::null(),
                &mut out_buf,
                &mut out_len,
            )
        };
        assert_eq!(rc, 3);
        assert!(out_buf.is_null());
    }

    #[test]
    fn ffi_unsupported_format_names_identifier() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let template = CString::new(file.path().to_str().unwrap()).unwrap();
        let format = CString::new("laserjet").unwrap();
        let opts = options(&format, &template);
        let json = serde_json::to_vec(&sample_slip()).unwrap();

        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe {
            boleto_render_json(
                json.as_ptr(),
                json.len() as u32,
                &opts,
                &mut out_buf,
                &mut out_len,
            )
        };
        assert_eq!(rc, 4);
        assert!(out_buf.is_null());
        assert!(last_error().contains("laserjet"));
    }

    #[test]
    fn ffi_version() {
        let v = boleto_version();
        let version = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }
}
