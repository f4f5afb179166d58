//! Translation resource table for English, Hindi and Marathi.
//!
//! DESIGN
//! ======
//! Tables are static `(key, text)` slices, one per locale. English is the
//! reference locale: every key must exist there, and lookups in the other
//! locales fall back to English, then to the key itself.
//!
//! The request locale is negotiated per request: `?lang=` query parameter,
//! then the `lang` cookie, then `Accept-Language`, then the configured
//! default.

use std::collections::BTreeMap;

use axum::extract::FromRef;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub const LANG_COOKIE: &str = "lang";

// =============================================================================
// LOCALE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Hi,
    Mr,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Hi, Locale::Mr];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Mr => "mr",
        }
    }

    /// Name of the language in that language, for the language picker.
    #[must_use]
    pub fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिन्दी",
            Self::Mr => "मराठी",
        }
    }

    /// Parse a language tag. Region subtags (`hi-IN`, `mr_IN`) are ignored.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            "mr" => Some(Self::Mr),
            _ => None,
        }
    }

    fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::En => EN,
            Self::Hi => HI,
            Self::Mr => MR,
        }
    }
}

// =============================================================================
// LOOKUP
// =============================================================================

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    locale
        .entries()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Translate `key`, falling back to English and then to the key itself.
#[must_use]
pub fn translate<'a>(locale: Locale, key: &'a str) -> &'a str {
    match lookup(locale, key).or_else(|| lookup(Locale::En, key)) {
        Some(text) => text,
        None => key,
    }
}

/// Full table for a locale, with English filling any gaps.
#[must_use]
pub fn table(locale: Locale) -> BTreeMap<&'static str, &'static str> {
    let mut out: BTreeMap<&'static str, &'static str> = EN.iter().copied().collect();
    if locale != Locale::En {
        out.extend(locale.entries().iter().copied());
    }
    out
}

// =============================================================================
// NEGOTIATION
// =============================================================================

/// Pick the best supported locale from an `Accept-Language` header value.
#[must_use]
pub fn from_accept_language(header: &str) -> Option<Locale> {
    let mut candidates: Vec<(f32, Locale)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .map_or(Some(1.0), |q| q.trim().parse::<f32>().ok())?;
            if quality <= 0.0 {
                return None;
            }
            Locale::parse(tag).map(|locale| (quality, locale))
        })
        .collect();
    // Stable sort keeps header order for equal weights.
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    candidates.first().map(|(_, locale)| *locale)
}

/// Resolve the request locale from its three possible sources.
#[must_use]
pub fn negotiate(query: Option<&str>, cookie: Option<&str>, accept_language: Option<&str>, default: Locale) -> Locale {
    query
        .and_then(Locale::parse)
        .or_else(|| cookie.and_then(Locale::parse))
        .or_else(|| accept_language.and_then(from_accept_language))
        .unwrap_or(default)
}

fn query_lang(query: &str) -> Option<&str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "lang")
        .map(|(_, v)| v)
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Locale of the current request. Never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl RequestLocale {
    #[must_use]
    pub fn t(self, key: &str) -> &str {
        translate(self.0, key)
    }
}

impl<S> axum::extract::FromRequestParts<S> for RequestLocale
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let default = AppState::from_ref(state).config.default_locale;
        let jar = CookieJar::from_headers(&parts.headers);
        let query = parts.uri.query().and_then(query_lang);
        let cookie = jar.get(LANG_COOKIE).map(|c| c.value());
        let accept = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Ok(Self(negotiate(query, cookie, accept, default)))
    }
}

// =============================================================================
// TABLES
// =============================================================================

const EN: &[(&str, &str)] = &[
    // Navigation
    ("dashboard", "Dashboard"),
    ("scan_product", "Scan Product"),
    ("my_kyc", "My KYC"),
    ("supply_chain", "Supply Chain Trace"),
    ("reports", "Reports"),
    ("settings", "Settings"),
    // Hero
    ("hero_title", "Verify. Trust. Trace."),
    ("hero_subtitle", "Transparent supply chain verification for herbal products"),
    ("scan_qr_button", "Scan QR Code"),
    ("learn_more", "Learn More"),
    // Dashboard
    ("welcome_back", "Welcome back"),
    ("products_scanned", "Products Scanned"),
    ("verified_products", "Verified Products"),
    ("sustainability_score", "Sustainability Score"),
    ("recent_scans", "Recent Scans"),
    ("total_batches", "Total Batches"),
    ("total_quantity", "Total Quantity"),
    ("active_batches", "Active Batches"),
    ("avg_quality_score", "Average Quality Score"),
    // KYC
    ("kyc_registration", "KYC Registration"),
    ("full_name", "Full Name"),
    ("phone_number", "Phone Number"),
    ("email_address", "Email Address"),
    ("id_proof", "ID Proof"),
    ("submit", "Submit"),
    // Scanner
    ("scanning", "Scanning..."),
    ("scan_result", "Scan Result"),
    ("product_verified", "Product Verified"),
    ("blockchain_verified", "✅ Verified on Ayur-Veritas Blockchain"),
    // Supply chain
    ("farmer_details", "Farmer Details"),
    ("harvest_info", "Harvest Information"),
    ("processing_steps", "Processing Steps"),
    ("lab_results", "Lab Results"),
    ("distribution", "Distribution"),
    // Statuses
    ("status_harvested", "Harvested"),
    ("status_processed", "Processed"),
    ("status_in_transit", "In Transit"),
    ("status_delivered", "Delivered"),
    ("status_verified", "Verified"),
    // Roles
    ("role_farmer", "Farmer"),
    ("role_distributor", "Distributor"),
    ("role_consumer", "Consumer"),
    // Notices
    ("notice_batch_registered", "Batch registered successfully!"),
    ("notice_farm_added", "Farm added successfully!"),
    ("notice_farm_updated", "Farm updated successfully!"),
    ("notice_qr_generated", "QR Code Generated"),
    ("notice_status_updated", "Batch status updated"),
    (
        "notice_kyc_submitted",
        "Your KYC details have been submitted for verification. You'll receive an update within 24 hours.",
    ),
    ("notice_code_sent", "We sent a login code to your email."),
    // Errors
    ("error_validation", "Please check the highlighted fields."),
    ("error_not_found", "The requested record was not found."),
    ("error_unauthorized", "Please sign in to continue."),
    ("error_forbidden", "You do not have permission to do that."),
    ("error_conflict", "That record already exists or was changed by someone else."),
    ("error_rate_limited", "Too many requests. Please wait a moment and try again."),
    ("error_internal", "Something went wrong. Please try again."),
    ("error_profile_required", "Please complete your profile first."),
    ("error_qr_required", "Please enter a QR code."),
    ("error_qr_invalid", "Invalid QR code. This product could not be verified."),
    ("error_invalid_transition", "This batch cannot move to that status."),
    ("error_login_failed", "Expired or incorrect code."),
    // E-mail
    ("email_code_title", "Your Ayur-Veritas access code"),
    ("email_code_footer", "This code expires in 10 minutes. If you did not request it, you can ignore this email."),
];

const HI: &[(&str, &str)] = &[
    ("dashboard", "डैशबोर्ड"),
    ("scan_product", "उत्पाद स्कैन करें"),
    ("my_kyc", "मेरी केवाईसी"),
    ("supply_chain", "आपूर्ति श्रृंखला"),
    ("reports", "रिपोर्ट"),
    ("settings", "सेटिंग्स"),
    ("hero_title", "सत्यापित करें। भरोसा करें। ट्रेस करें।"),
    ("hero_subtitle", "हर्बल उत्पादों के लिए पारदर्शी आपूर्ति श्रृंखला सत्यापन"),
    ("scan_qr_button", "क्यूआर कोड स्कैन करें"),
    ("learn_more", "और जानें"),
    ("welcome_back", "वापसी पर स्वागत"),
    ("products_scanned", "स्कैन किए गए उत्पाद"),
    ("verified_products", "सत्यापित उत्पाद"),
    ("sustainability_score", "स्थिरता स्कोर"),
    ("recent_scans", "हाल की स्कैन"),
    ("total_batches", "कुल बैच"),
    ("total_quantity", "कुल मात्रा"),
    ("active_batches", "सक्रिय बैच"),
    ("avg_quality_score", "औसत गुणवत्ता स्कोर"),
    ("kyc_registration", "केवाईसी पंजीकरण"),
    ("full_name", "पूरा नाम"),
    ("phone_number", "फोन नंबर"),
    ("email_address", "ईमेल पता"),
    ("id_proof", "पहचान प्रमाण"),
    ("submit", "जमा करें"),
    ("scanning", "स्कैनिंग..."),
    ("scan_result", "स्कैन परिणाम"),
    ("product_verified", "उत्पाद सत्यापित"),
    ("blockchain_verified", "✅ आयुर-वेरिटास ब्लॉकचेन पर सत्यापित"),
    ("farmer_details", "किसान विवरण"),
    ("harvest_info", "फसल की जानकारी"),
    ("processing_steps", "प्रसंस्करण चरण"),
    ("lab_results", "प्रयोगशाला परिणाम"),
    ("distribution", "वितरण"),
    ("status_harvested", "कटाई हुई"),
    ("status_processed", "प्रसंस्कृत"),
    ("status_in_transit", "रास्ते में"),
    ("status_delivered", "पहुँचाया गया"),
    ("status_verified", "सत्यापित"),
    ("role_farmer", "किसान"),
    ("role_distributor", "वितरक"),
    ("role_consumer", "उपभोक्ता"),
    ("notice_batch_registered", "बैच सफलतापूर्वक पंजीकृत हुआ!"),
    ("notice_farm_added", "खेत सफलतापूर्वक जोड़ा गया!"),
    ("notice_farm_updated", "खेत सफलतापूर्वक अपडेट किया गया!"),
    ("notice_qr_generated", "क्यूआर कोड बनाया गया"),
    ("notice_status_updated", "बैच की स्थिति अपडेट की गई"),
    ("notice_kyc_submitted", "आपका केवाईसी विवरण सत्यापन के लिए जमा हो गया है। 24 घंटे के भीतर आपको सूचना मिलेगी।"),
    ("notice_code_sent", "हमने आपके ईमेल पर लॉगिन कोड भेजा है।"),
    ("error_validation", "कृपया चिह्नित फ़ील्ड जाँचें।"),
    ("error_not_found", "अनुरोधित रिकॉर्ड नहीं मिला।"),
    ("error_unauthorized", "जारी रखने के लिए कृपया साइन इन करें।"),
    ("error_forbidden", "आपको यह करने की अनुमति नहीं है।"),
    ("error_conflict", "यह रिकॉर्ड पहले से मौजूद है या किसी और ने बदल दिया है।"),
    ("error_rate_limited", "बहुत अधिक अनुरोध। कृपया थोड़ी देर बाद पुनः प्रयास करें।"),
    ("error_internal", "कुछ गलत हो गया। कृपया पुनः प्रयास करें।"),
    ("error_profile_required", "कृपया पहले अपनी प्रोफ़ाइल पूरी करें।"),
    ("error_qr_required", "कृपया क्यूआर कोड दर्ज करें।"),
    ("error_qr_invalid", "अमान्य क्यूआर कोड। यह उत्पाद सत्यापित नहीं हो सका।"),
    ("error_invalid_transition", "यह बैच उस स्थिति में नहीं जा सकता।"),
    ("error_login_failed", "कोड समाप्त हो गया है या गलत है।"),
    ("email_code_title", "आपका आयुर-वेरिटास एक्सेस कोड"),
    ("email_code_footer", "यह कोड 10 मिनट में समाप्त हो जाएगा। यदि आपने इसका अनुरोध नहीं किया है, तो इस ईमेल को अनदेखा करें।"),
];

const MR: &[(&str, &str)] = &[
    ("dashboard", "डॅशबोर्ड"),
    ("scan_product", "उत्पादन स्कॅन करा"),
    ("my_kyc", "माझे केवायसी"),
    ("supply_chain", "पुरवठा साखळी"),
    ("reports", "अहवाल"),
    ("settings", "सेटिंग्ज"),
    ("hero_title", "सत्यापित करा. विश्वास ठेवा. मागोवा घ्या."),
    ("hero_subtitle", "हर्बल उत्पादनांसाठी पारदर्शक पुरवठा साखळी सत्यापन"),
    ("scan_qr_button", "क्यूआर कोड स्कॅन करा"),
    ("learn_more", "आणखी जाणून घ्या"),
    ("welcome_back", "परत आपले स्वागत"),
    ("products_scanned", "स्कॅन केलेली उत्पादने"),
    ("verified_products", "सत्यापित उत्पादने"),
    ("sustainability_score", "टिकाऊपणा गुण"),
    ("recent_scans", "अलीकडील स्कॅन"),
    ("total_batches", "एकूण बॅच"),
    ("total_quantity", "एकूण प्रमाण"),
    ("active_batches", "सक्रिय बॅच"),
    ("avg_quality_score", "सरासरी गुणवत्ता गुण"),
    ("kyc_registration", "केवायसी नोंदणी"),
    ("full_name", "पूर्ण नाव"),
    ("phone_number", "फोन नंबर"),
    ("email_address", "ईमेल पत्ता"),
    ("id_proof", "ओळख पुरावा"),
    ("submit", "सबमिट करा"),
    ("scanning", "स्कॅनिंग..."),
    ("scan_result", "स्कॅन परिणाम"),
    ("product_verified", "उत्पादन सत्यापित"),
    ("blockchain_verified", "✅ आयुर-वेरिटास ब्लॉकचेनवर सत्यापित"),
    ("farmer_details", "शेतकरी तपशील"),
    ("harvest_info", "कापणी माहिती"),
    ("processing_steps", "प्रक्रिया पायऱ्या"),
    ("lab_results", "प्रयोगशाळा परिणाम"),
    ("distribution", "वितरण"),
    ("status_harvested", "कापणी झाली"),
    ("status_processed", "प्रक्रिया केलेले"),
    ("status_in_transit", "वाटेत"),
    ("status_delivered", "पोहोचवले"),
    ("status_verified", "सत्यापित"),
    ("role_farmer", "शेतकरी"),
    ("role_distributor", "वितरक"),
    ("role_consumer", "ग्राहक"),
    ("notice_batch_registered", "बॅच यशस्वीरित्या नोंदवली!"),
    ("notice_farm_added", "शेत यशस्वीरित्या जोडले!"),
    ("notice_farm_updated", "शेत यशस्वीरित्या अद्ययावत केले!"),
    ("notice_qr_generated", "क्यूआर कोड तयार केला"),
    ("notice_status_updated", "बॅचची स्थिती अद्ययावत केली"),
    ("notice_kyc_submitted", "तुमचे केवायसी तपशील पडताळणीसाठी सादर केले आहेत. 24 तासांत तुम्हाला कळवले जाईल."),
    ("notice_code_sent", "आम्ही तुमच्या ईमेलवर लॉगिन कोड पाठवला आहे."),
    ("error_validation", "कृपया चिन्हांकित फील्ड तपासा."),
    ("error_not_found", "विनंती केलेली नोंद सापडली नाही."),
    ("error_unauthorized", "पुढे जाण्यासाठी कृपया साइन इन करा."),
    ("error_forbidden", "तुम्हाला हे करण्याची परवानगी नाही."),
    ("error_conflict", "ही नोंद आधीच अस्तित्वात आहे किंवा दुसऱ्याने बदलली आहे."),
    ("error_rate_limited", "खूप विनंत्या. कृपया थोड्या वेळाने पुन्हा प्रयत्न करा."),
    ("error_internal", "काहीतरी चूक झाली. कृपया पुन्हा प्रयत्न करा."),
    ("error_profile_required", "कृपया आधी तुमची प्रोफाइल पूर्ण करा."),
    ("error_qr_required", "कृपया क्यूआर कोड प्रविष्ट करा."),
    ("error_qr_invalid", "अवैध क्यूआर कोड. हे उत्पादन सत्यापित होऊ शकले नाही."),
    ("error_invalid_transition", "ही बॅच त्या स्थितीत जाऊ शकत नाही."),
    ("error_login_failed", "कोड कालबाह्य किंवा चुकीचा आहे."),
    ("email_code_title", "तुमचा आयुर-वेरिटास प्रवेश कोड"),
    ("email_code_footer", "हा कोड 10 मिनिटांत कालबाह्य होईल. तुम्ही याची विनंती केली नसल्यास, हा ईमेल दुर्लक्षित करा."),
];

#[cfg(test)]
#[path = "i18n_test.rs"]
mod tests;
