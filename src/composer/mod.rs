pub mod templates;

use crate::config::{PromoConfig, ValidationConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::filter::Category;
use crate::guarantor::FinalTag;
use crate::validator::weighted_length;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketingAngle {
    Cost,
    Latency,
    Autoscale,
    Regions,
    Uptime,
    Support,
}

impl MarketingAngle {
    /// Rotation order
    pub const ALL: [MarketingAngle; 6] = [
        MarketingAngle::Cost,
        MarketingAngle::Latency,
        MarketingAngle::Autoscale,
        MarketingAngle::Regions,
        MarketingAngle::Uptime,
        MarketingAngle::Support,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MarketingAngle::Cost => "cost",
            MarketingAngle::Latency => "latency",
            MarketingAngle::Autoscale => "autoscale",
            MarketingAngle::Regions => "regions",
            MarketingAngle::Uptime => "uptime",
            MarketingAngle::Support => "support",
        }
    }
}

impl fmt::Display for MarketingAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round-robin position over [`MarketingAngle::ALL`]. Owned by one account's
/// pipeline and only replaced when a draft is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AngleCursor {
    index: usize,
}

impl AngleCursor {
    pub fn new(start: usize) -> Self {
        Self {
            index: start % MarketingAngle::ALL.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> MarketingAngle {
        MarketingAngle::ALL[self.index]
    }

    pub fn advanced(&self) -> Self {
        Self::new(self.index + 1)
    }
}

/// What a hyperscaler charges for comparable hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalPrice {
    pub provider: String,
    pub price_usd_per_hr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferFact {
    pub gpu_model: String,
    pub price_usd_per_hr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rival: Option<RivalPrice>,
}

impl OfferFact {
    pub fn new(gpu_model: &str, price_usd_per_hr: f64, region: Option<&str>) -> Self {
        Self {
            gpu_model: gpu_model.to_string(),
            price_usd_per_hr,
            region: region.map(str::to_string),
            rival: None,
        }
    }

    pub fn with_rival(mut self, provider: &str, price_usd_per_hr: f64) -> Self {
        self.rival = Some(RivalPrice {
            provider: provider.to_string(),
            price_usd_per_hr,
        });
        self
    }

    pub fn price_label(&self) -> String {
        format!("${:.2}/hr", self.price_usd_per_hr)
    }

    /// Whole percent saved against the rival price, rounded down. `None`
    /// without a rival or when the rival is not more expensive.
    pub fn savings_pct(&self) -> Option<u32> {
        let rival = self.rival.as_ref()?;
        if rival.price_usd_per_hr <= self.price_usd_per_hr {
            return None;
        }
        let pct = (rival.price_usd_per_hr - self.price_usd_per_hr) / rival.price_usd_per_hr * 100.0;
        Some(pct.floor() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftPost {
    pub body: String,
    /// Without the leading `#`, in render order
    pub hashtags: Vec<String>,
    pub angle: MarketingAngle,
    pub promo_code: String,
    pub url: String,
    pub category: Category,
    pub fallback: bool,
}

/// A draft plus the cursor to commit if the caller accepts it.
#[derive(Debug, Clone)]
pub struct Composition {
    pub draft: DraftPost,
    pub next_cursor: AngleCursor,
}

pub struct TemplateComposer {
    account: String,
    base_url: Url,
    promo_code: String,
    utm_source: String,
    utm_medium: String,
    length_budget: usize,
    url_weight: usize,
    max_hashtags: usize,
}

impl TemplateComposer {
    pub fn new(promo: &PromoConfig, validation: &ValidationConfig, account: &str) -> ConfigResult<Self> {
        if promo.code.trim().is_empty() {
            return Err(ConfigError::EmptyPromoCode);
        }
        let base_url = Url::parse(&promo.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: promo.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            account: account.to_string(),
            base_url,
            promo_code: promo.code.clone(),
            utm_source: promo.utm_source.clone(),
            utm_medium: promo.utm_medium.clone(),
            length_budget: validation.length_budget,
            url_weight: validation.url_weight,
            max_hashtags: validation.max_hashtags,
        })
    }

    /// Tracked link: UTM parameters plus a fresh `utm_id` per post.
    pub fn tracked_url(&self, hashtags: &[String]) -> String {
        let utm_id = uuid::Uuid::new_v4().simple().to_string();
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("utm_source", &self.utm_source)
            .append_pair("utm_medium", &self.utm_medium)
            .append_pair("utm_campaign", &format!("promo_{}", self.promo_code))
            .append_pair("utm_content", &self.account)
            .append_pair("utm_term", &hashtags.join("+"))
            .append_pair("utm_id", &utm_id[..8]);
        url.to_string()
    }

    fn render(&self, template: &str, hook: &str, trend: &str, offer: &OfferFact, url: &str) -> String {
        let region = offer.region.as_deref().unwrap_or(templates::ANY_REGION);
        template
            .replace("{hook}", hook)
            .replace("{trend}", trend)
            .replace("{model}", &offer.gpu_model)
            .replace("{price}", &offer.price_label())
            .replace("{region}", region)
            .replace("{rival}", offer.rival.as_ref().map_or("", |r| r.provider.as_str()))
            .replace(
                "{rival_price}",
                &offer
                    .rival
                    .as_ref()
                    .map(|r| format!("${:.2}/hr", r.price_usd_per_hr))
                    .unwrap_or_default(),
            )
            .replace("{savings}", &offer.savings_pct().map(|p| p.to_string()).unwrap_or_default())
            .replace("{code}", &self.promo_code)
            .replace("{url}", url)
            .trim()
            .to_string()
    }

    fn with_hashtags(body: &str, hashtags: &[String]) -> String {
        if hashtags.is_empty() {
            return body.to_string();
        }
        let rendered: Vec<String> = hashtags.iter().map(|t| format!("#{t}")).collect();
        format!("{} {}", body, rendered.join(" "))
    }

    /// Draft a post for `cursor.current()`. `attempt` varies the template and
    /// hook between retries of the same cycle.
    pub fn compose(
        &self,
        tags: &[FinalTag],
        cursor: AngleCursor,
        offer: &OfferFact,
        attempt: usize,
    ) -> Composition {
        let angle = cursor.current();
        let lead = tags.first();

        // A synthesized lead is not a live trend, so no trend-specific copy
        let category = match lead {
            Some(tag) if !tag.synthesized => tag.category,
            _ => Category::Other,
        };
        let trend = lead.map(|t| t.text.as_str()).unwrap_or_default();

        let hashtags: Vec<String> = tags
            .iter()
            .take(self.max_hashtags)
            .map(|t| t.text.clone())
            .collect();
        let url = self.tracked_url(&hashtags);

        let hook_bank = templates::hooks(category);
        let hook = hook_bank[pick(trend, attempt, hook_bank.len())];

        let mut variants: Vec<&str> = templates::category_bank(category, angle).to_vec();
        if offer.savings_pct().is_some() {
            variants.extend_from_slice(templates::comparison_bank(angle));
        }
        variants.extend_from_slice(templates::generic_bank(angle));
        let start = attempt % variants.len();
        variants.rotate_left(start);

        let rendered: Vec<String> = variants
            .iter()
            .map(|t| Self::with_hashtags(&self.render(t, hook, trend, offer, &url), &hashtags))
            .collect();

        let body = rendered
            .iter()
            .find(|b| weighted_length(b, self.url_weight) <= self.length_budget)
            .or_else(|| {
                rendered
                    .iter()
                    .min_by_key(|b| weighted_length(b, self.url_weight))
            })
            .cloned()
            .unwrap_or_default();

        Composition {
            draft: DraftPost {
                body,
                hashtags,
                angle,
                promo_code: self.promo_code.clone(),
                url,
                category,
                fallback: false,
            },
            next_cursor: cursor.advanced(),
        }
    }

    /// Known-safe canned draft with a fixed domain hashtag.
    pub fn fallback(&self, cursor: AngleCursor, offer: &OfferFact) -> Composition {
        let hashtags = vec![templates::FALLBACK_HASHTAG.to_string()];
        let url = self.tracked_url(&hashtags);
        let body = Self::with_hashtags(
            &self.render(templates::FALLBACK_TEMPLATE, "", "", offer, &url),
            &hashtags,
        );

        Composition {
            draft: DraftPost {
                body,
                hashtags,
                angle: cursor.current(),
                promo_code: self.promo_code.clone(),
                url,
                category: Category::Other,
                fallback: true,
            },
            next_cursor: cursor.advanced(),
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the seed and attempt, so hook choice is the same on every
/// build and platform.
fn pick(seed: &str, attempt: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let hash = seed
        .bytes()
        .chain((attempt as u64).to_le_bytes())
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME));
    (hash % len as u64) as usize
}
