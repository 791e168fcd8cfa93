// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Downloads and external links.

use marker_reveal_core::backend::{Outbox, OutboxError};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, Url, Window};

/// Offers files through a temporary object URL and a synthetic anchor click,
/// and opens links in a new tab.
///
/// Hosts without `URL.createObjectURL` or `window.open` (some embedded
/// webviews) report [`OutboxError::Unsupported`].
pub struct BrowserOutbox {
    window: Window,
    document: Document,
}

impl core::fmt::Debug for BrowserOutbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BrowserOutbox").finish_non_exhaustive()
    }
}

impl BrowserOutbox {
    /// Creates an outbox for `document`. Returns `None` if the document has
    /// no window.
    #[must_use]
    pub fn new(document: Document) -> Option<Self> {
        let window = document.default_view()?;
        Some(Self { window, document })
    }

    fn try_download(&self, file_name: &str, mime_type: &str, body: &str) -> Result<(), JsValue> {
        let parts = js_sys::Array::of1(&JsValue::from_str(body));
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let anchor: HtmlAnchorElement = self.document.create_element("a")?.unchecked_into();
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();

        Url::revoke_object_url(&url)
    }
}

impl Outbox for BrowserOutbox {
    fn download(
        &mut self,
        file_name: &str,
        mime_type: &str,
        body: &str,
    ) -> Result<(), OutboxError> {
        let url_ctor = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("URL"))
            .unwrap_or(JsValue::UNDEFINED);
        if !has_method(&url_ctor, "createObjectURL") {
            return Err(OutboxError::Unsupported);
        }
        self.try_download(file_name, mime_type, body)
            .map_err(|_| OutboxError::Failed)
    }

    fn open_link(&mut self, url: &str) -> Result<(), OutboxError> {
        if !has_method(&self.window, "open") {
            return Err(OutboxError::Unsupported);
        }
        match self.window.open_with_url_and_target(url, "_blank") {
            Ok(Some(_)) => Ok(()),
            // Popup blockers return `null` instead of throwing.
            Ok(None) | Err(_) => Err(OutboxError::Failed),
        }
    }
}

fn has_method(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::get(target, &JsValue::from_str(name)).is_ok_and(|f| f.is_function())
}
