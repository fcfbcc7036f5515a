/// Locale-aware string ordering for tab sorting
use std::cmp::Ordering;

#[cfg(not(target_arch = "wasm32"))]
use icu_collator::options::{CollatorOptions, Strength};
#[cfg(not(target_arch = "wasm32"))]
use icu_collator::{Collator, CollatorBorrowed};
#[cfg(not(target_arch = "wasm32"))]
use log::warn;

/// Case-insensitive comparison in the user's locale.
///
/// The extension build defers to the browser's `localeCompare`; native builds
/// use the ICU root collation.
pub struct Collation {
    #[cfg(not(target_arch = "wasm32"))]
    collator: Option<CollatorBorrowed<'static>>,
}

#[cfg(target_arch = "wasm32")]
impl Collation {
    pub fn new() -> Self {
        Collation {}
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let a = js_sys::JsString::from(a.to_lowercase());
        a.locale_compare(&b.to_lowercase(), &js_sys::Array::new(), &js_sys::Object::new())
            .cmp(&0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Collation {
    pub fn new() -> Self {
        let mut options = CollatorOptions::default();
        // accents still count, case does not
        options.strength = Some(Strength::Secondary);
        let collator = Collator::try_new(Default::default(), options)
            .map_err(|e| warn!("no collation data, using code point order: {:?}", e))
            .ok();
        Collation { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

impl Default for Collation {
    fn default() -> Self {
        Collation::new()
    }
}
