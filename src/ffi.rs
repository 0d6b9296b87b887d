//! C-compatible API for host views embedding the renderer.
//!
//! # ABI Contract
//!
//! All exported functions use the `extern "C"` calling convention and
//! `#[no_mangle]` symbol names prefixed `ifg_`.
//!
//! ## Memory management
//! - Buffers and strings returned by `ifg_*` functions live on the Rust heap.
//! - Callers **must** release them with `ifg_free_buffer` / `ifg_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions return a `c_int` (0 = success, non-zero = error code).
//! - The message for the last failure on the calling thread is available
//!   from `ifg_last_error`.
//!
//! ## Documents
//! Documents cross the boundary as the JSON form of `InvoiceDocument`
//! (camelCase keys). Template names follow `TemplateSelector::name`;
//! unrecognised names render with the neutral fallback.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::config::ExportConfig;
use crate::dom::{to_html, DomNode};
use crate::error::Error;
use crate::export::Exporter;
use crate::fonts::FontManager;
use crate::model::InvoiceDocument;
use crate::raster::ExportFormat;
use crate::renderer;

pub const IFG_OK: c_int = 0;
pub const IFG_ERR_NULL: c_int = 1;
pub const IFG_ERR_UTF8: c_int = 2;
pub const IFG_ERR_INPUT: c_int = 3;
pub const IFG_ERR_EXPORT: c_int = 4;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg.replace('\0', " ")).ok();
    });
}

/// # Safety
/// `s` must be null or a valid null-terminated string.
unsafe fn read_str<'a>(s: *const c_char) -> Result<&'a str, c_int> {
    if s.is_null() {
        set_last_error("Null pointer argument");
        return Err(IFG_ERR_NULL);
    }
    CStr::from_ptr(s).to_str().map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        IFG_ERR_UTF8
    })
}

fn parse_document(json: &str) -> Result<InvoiceDocument, c_int> {
    InvoiceDocument::from_json(json).map_err(|e| {
        set_last_error(&format!("Invalid document JSON: {e}"));
        IFG_ERR_INPUT
    })
}

fn export_bytes(doc: &InvoiceDocument, template: &str, format: ExportFormat) -> Result<(Vec<u8>, String), Error> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let exporter = Exporter::with_defaults(&ExportConfig::default(), FontManager::default());
    let artifact = runtime.block_on(exporter.export_named(doc, template, format))?;
    Ok((artifact.bytes, artifact.filename))
}

/// Render a document to preview HTML.
///
/// # Parameters
/// - `doc_json`: null-terminated document JSON
/// - `template`: null-terminated template name
/// - `out_html`: on success, receives a string to free with `ifg_free_string`
///
/// # Safety
/// All pointers must be valid; string arguments must be null-terminated.
#[no_mangle]
pub unsafe extern "C" fn ifg_render_html(
    doc_json: *const c_char,
    template: *const c_char,
    out_html: *mut *mut c_char,
) -> c_int {
    if out_html.is_null() {
        set_last_error("Null pointer argument");
        return IFG_ERR_NULL;
    }
    let (json, name) = match (read_str(doc_json), read_str(template)) {
        (Ok(j), Ok(n)) => (j, n),
        (Err(rc), _) | (_, Err(rc)) => return rc,
    };
    let doc = match parse_document(json) {
        Ok(d) => d,
        Err(rc) => return rc,
    };

    let html = to_html(&[DomNode::from(renderer::render_named(&doc, name))]);
    match CString::new(html) {
        Ok(cs) => {
            *out_html = cs.into_raw();
            IFG_OK
        }
        Err(_) => {
            set_last_error("HTML contained null byte");
            IFG_ERR_INPUT
        }
    }
}

/// Export a document as `format` (`"pdf"` or `"png"`).
///
/// # Parameters
/// - `doc_json`, `template`, `format`: null-terminated UTF-8 strings
/// - `out_buf`, `out_len`: receive the file bytes (free with `ifg_free_buffer`)
/// - `out_filename`: optional; receives the derived filename (free with
///   `ifg_free_string`). Pass null to skip.
///
/// # Safety
/// String arguments must be valid null-terminated strings; `out_buf` and
/// `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn ifg_export(
    doc_json: *const c_char,
    template: *const c_char,
    format: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
    out_filename: *mut *mut c_char,
) -> c_int {
    if out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return IFG_ERR_NULL;
    }
    let (json, name, fmt) = match (read_str(doc_json), read_str(template), read_str(format)) {
        (Ok(j), Ok(n), Ok(f)) => (j, n, f),
        (Err(rc), _, _) | (_, Err(rc), _) | (_, _, Err(rc)) => return rc,
    };
    let doc = match parse_document(json) {
        Ok(d) => d,
        Err(rc) => return rc,
    };
    let format: ExportFormat = match fmt.parse() {
        Ok(f) => f,
        Err(e) => {
            set_last_error(&e.to_string());
            return IFG_ERR_INPUT;
        }
    };

    match export_bytes(&doc, name, format) {
        Ok((bytes, filename)) => {
            let len = bytes.len() as u32;
            *out_buf = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
            *out_len = len;
            if !out_filename.is_null() {
                *out_filename = CString::new(filename).map_or(ptr::null_mut(), CString::into_raw);
            }
            IFG_OK
        }
        Err(e) => {
            log::warn!("export failed: {e}");
            set_last_error(&e.to_string());
            IFG_ERR_EXPORT
        }
    }
}

/// Free a buffer returned by `ifg_export`.
///
/// # Safety
/// `buf` and `len` must come from the same successful `ifg_export` call.
#[no_mangle]
pub unsafe extern "C" fn ifg_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string returned through an `ifg_*` out-parameter.
///
/// # Safety
/// `s` must have been produced by this library.
#[no_mangle]
pub unsafe extern "C" fn ifg_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Last error message on this thread, or null. Valid until the next
/// `ifg_*` call on the same thread; do **not** free it.
#[no_mangle]
pub extern "C" fn ifg_last_error() -> *const c_char {
    LAST_ERROR.with(|e| e.borrow().as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstring(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn default_json() -> CString {
        cstring(&InvoiceDocument::default().to_json().unwrap())
    }

    #[test]
    fn render_html_round_trip() {
        let json = default_json();
        let name = cstring("STANDARD_BLUE");
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { ifg_render_html(json.as_ptr(), name.as_ptr(), &mut out) };
        assert_eq!(rc, IFG_OK);
        let html = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        assert!(html.contains(r#"id="invoice-preview""#));
        unsafe { ifg_free_string(out) };
    }

    #[test]
    fn bad_json_sets_last_error() {
        let json = cstring("{");
        let name = cstring("GRID_TECH");
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { ifg_render_html(json.as_ptr(), name.as_ptr(), &mut out) };
        assert_eq!(rc, IFG_ERR_INPUT);
        let msg = unsafe { CStr::from_ptr(ifg_last_error()) }.to_str().unwrap();
        assert!(msg.starts_with("Invalid document JSON"));
    }

    #[test]
    fn null_arguments_are_rejected() {
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { ifg_render_html(ptr::null(), ptr::null(), &mut out) };
        assert_eq!(rc, IFG_ERR_NULL);
    }

    #[test]
    fn export_pdf_with_filename() {
        let json = default_json();
        let name = cstring("MINIMAL_CLEAN");
        let fmt = cstring("pdf");
        let mut buf: *mut u8 = ptr::null_mut();
        let mut len = 0u32;
        let mut filename: *mut c_char = ptr::null_mut();
        let rc = unsafe {
            ifg_export(json.as_ptr(), name.as_ptr(), fmt.as_ptr(), &mut buf, &mut len, &mut filename)
        };
        assert_eq!(rc, IFG_OK);
        let bytes = unsafe { slice::from_raw_parts(buf, len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");
        let filename_str = unsafe { CStr::from_ptr(filename) }.to_str().unwrap();
        assert_eq!(filename_str, "Invoice-INV-001_Client.pdf");
        unsafe {
            ifg_free_buffer(buf, len);
            ifg_free_string(filename);
        }
    }

    #[test]
    fn unknown_format_is_an_input_error() {
        let json = default_json();
        let name = cstring("MINIMAL_CLEAN");
        let fmt = cstring("docx");
        let mut buf: *mut u8 = ptr::null_mut();
        let mut len = 0u32;
        let rc = unsafe {
            ifg_export(json.as_ptr(), name.as_ptr(), fmt.as_ptr(), &mut buf, &mut len, ptr::null_mut())
        };
        assert_eq!(rc, IFG_ERR_INPUT);
        assert!(buf.is_null());
    }
}
