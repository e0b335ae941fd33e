use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, Incident, IncidentCategory, Language, Severity};

use super::distance::format_distance;

/// Non-critical notifications close themselves after this long.
pub const AUTO_CLOSE_AFTER: Duration = Duration::from_secs(10);

/// Short link appended to every SMS alert.
pub const APP_LINK: &str = "bit.ly/safealert-rw";

const BRAND: &str = "SafeAlert Rwanda";

/// A browser-style notification ready for a delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedNotification {
    /// Platform tag; repeated tags replace rather than stack.
    pub tag: String,
    pub title: String,
    pub body: String,
    /// Critical notifications stay until the user acts.
    pub require_interaction: bool,
    pub auto_close_after: Option<Duration>,
}

/// Message template builder. Titles and SMS text follow the Kinyarwanda
/// wording used across SafeAlert; category labels follow the subject's language.
pub struct NotificationTemplates;

impl NotificationTemplates {
    /// Browser/push notification for one incident.
    pub fn browser(
        incident: &Incident,
        distance_km: Option<f64>,
        lang: Language,
    ) -> RenderedNotification {
        let title = match incident.severity.urgency_marker() {
            Some(marker) => format!("🚨 {} - {}", BRAND, marker),
            None => format!("🚨 {}", BRAND),
        };

        let mut body = format!(
            "{} {}\n📍 {}",
            incident.category.icon(),
            Self::headline(incident, lang),
            incident.location_address,
        );
        if let Some(km) = distance_km {
            body.push_str(&format!("\n📏 {}", format_distance(km)));
        }

        let critical = incident.severity == Severity::Critical;
        RenderedNotification {
            tag: incident.id.clone(),
            title,
            body,
            require_interaction: critical,
            auto_close_after: if critical { None } else { Some(AUTO_CLOSE_AFTER) },
        }
    }

    /// SMS text for one incident.
    pub fn sms(incident: &Incident, distance_km: Option<f64>, lang: Language) -> String {
        let urgency = if incident.severity == Severity::Critical {
            "BIKOMEYE "
        } else {
            ""
        };
        let distance = distance_km
            .map(|km| format!(". Intera: {:.1}km", km))
            .unwrap_or_default();

        format!(
            "{} {}{} {}. Ahantu: {}{}. Hamagara 112 ukeneye ubufasha. {}",
            BRAND,
            urgency,
            incident.category.icon(),
            Self::headline(incident, lang),
            incident.location_address,
            distance,
            APP_LINK,
        )
    }

    /// Message a subject sends to share their own position. `link` points
    /// at the live tracking page for the share.
    pub fn location_share(
        position: &GeoPoint,
        emergency: Option<IncidentCategory>,
        link: &str,
    ) -> String {
        match emergency {
            Some(category) => format!(
                "🚨 UBWOBA - {}! Ndi ahantu: {:.6}, {:.6}. Mukurebe ahantu ndi: {}. Mufashe 112!",
                category, position.latitude, position.longitude, link,
            ),
            None => format!(
                "📍 Ndi ahantu: {:.6}, {:.6}. Mukurebe: {}",
                position.latitude, position.longitude, link,
            ),
        }
    }

    /// Short SMS variant of the share message.
    pub fn location_share_sms(position: &GeoPoint, link: &str) -> String {
        format!(
            "SafeAlert: Ndi ahantu {:.6}, {:.6}. {}",
            position.latitude, position.longitude, link,
        )
    }

    /// Tracking page for one share, under `base` (no trailing slash needed).
    pub fn share_link(base: &str, share_id: &str) -> String {
        format!("{}/track/{}", base.trim_end_matches('/'), share_id)
    }

    fn headline(incident: &Incident, lang: Language) -> String {
        if incident.title.trim().is_empty() {
            incident.category.label(lang).to_string()
        } else {
            incident.title.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn incident(severity: Severity) -> Incident {
        let mut incident = Incident::new(
            "alert-7",
            IncidentCategory::Fire,
            severity,
            -1.9441,
            30.0619,
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
        )
        .unwrap();
        incident.title = "Inkongi y'umuriro".into();
        incident.location_address = "Kimironko Market, Kigali".into();
        incident
    }

    #[test]
    fn critical_title_and_interaction() {
        let n =
            NotificationTemplates::browser(&incident(Severity::Critical), Some(2.14), Language::En);
        assert_eq!(n.title, "🚨 SafeAlert Rwanda - BIKOMEYE");
        assert_eq!(n.tag, "alert-7");
        assert!(n.require_interaction);
        assert_eq!(n.auto_close_after, None);
        assert_eq!(
            n.body,
            "🔥 Inkongi y'umuriro\n📍 Kimironko Market, Kigali\n📏 2.1 km"
        );
    }

    #[test]
    fn high_title_marker() {
        let n = NotificationTemplates::browser(&incident(Severity::High), None, Language::En);
        assert_eq!(n.title, "🚨 SafeAlert Rwanda - BYIHUSE");
        assert!(!n.require_interaction);
        assert_eq!(n.auto_close_after, Some(AUTO_CLOSE_AFTER));
    }

    #[test]
    fn medium_title_has_no_marker() {
        let n = NotificationTemplates::browser(&incident(Severity::Medium), None, Language::En);
        assert_eq!(n.title, "🚨 SafeAlert Rwanda");
    }

    #[test]
    fn body_omits_distance_when_unknown() {
        let n = NotificationTemplates::browser(&incident(Severity::Low), None, Language::En);
        assert!(!n.body.contains("📏"));
    }

    #[test]
    fn zero_distance_is_still_shown() {
        let n = NotificationTemplates::browser(&incident(Severity::Low), Some(0.0), Language::En);
        assert!(n.body.ends_with("📏 0.0 km"));
    }

    #[test]
    fn empty_title_falls_back_to_localized_label() {
        let mut i = incident(Severity::Medium);
        i.title = "  ".into();
        let en = NotificationTemplates::browser(&i, None, Language::En);
        assert!(en.body.starts_with("🔥 Fire Emergency"));
        let rw = NotificationTemplates::browser(&i, None, Language::Rw);
        assert!(rw.body.starts_with("🔥 Ubwoba bw'Umuriro"));
    }

    #[test]
    fn sms_critical_with_distance() {
        let text =
            NotificationTemplates::sms(&incident(Severity::Critical), Some(0.84), Language::Rw);
        assert_eq!(
            text,
            "SafeAlert Rwanda BIKOMEYE 🔥 Inkongi y'umuriro. Ahantu: Kimironko Market, Kigali. \
             Intera: 0.8km. Hamagara 112 ukeneye ubufasha. bit.ly/safealert-rw"
        );
    }

    #[test]
    fn sms_non_critical_without_distance() {
        let text = NotificationTemplates::sms(&incident(Severity::High), None, Language::En);
        assert_eq!(
            text,
            "SafeAlert Rwanda 🔥 Inkongi y'umuriro. Ahantu: Kimironko Market, Kigali. \
             Hamagara 112 ukeneye ubufasha. bit.ly/safealert-rw"
        );
    }

    #[test]
    fn share_message_with_emergency() {
        let here = GeoPoint::new(-1.9441, 30.0619).unwrap();
        let link = "https://safealert.rw/track/s1";
        assert_eq!(
            NotificationTemplates::location_share(&here, Some(IncidentCategory::Fire), link),
            "🚨 UBWOBA - fire! Ndi ahantu: -1.944100, 30.061900. \
             Mukurebe ahantu ndi: https://safealert.rw/track/s1. Mufashe 112!"
        );
        assert_eq!(
            NotificationTemplates::location_share(&here, None, link),
            "📍 Ndi ahantu: -1.944100, 30.061900. Mukurebe: https://safealert.rw/track/s1"
        );
        assert_eq!(
            NotificationTemplates::location_share_sms(&here, link),
            "SafeAlert: Ndi ahantu -1.944100, 30.061900. https://safealert.rw/track/s1"
        );
    }

    #[test]
    fn share_link_joins_base_and_id() {
        assert_eq!(
            NotificationTemplates::share_link("https://safealert.rw/", "abc"),
            "https://safealert.rw/track/abc"
        );
        assert_eq!(
            NotificationTemplates::share_link("http://localhost:8080", "abc"),
            "http://localhost:8080/track/abc"
        );
    }
}
