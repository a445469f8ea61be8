use super::MarketingAngle;
use crate::filter::Category;

// Placeholders: {hook} {trend} {model} {price} {region} {code} {url}, plus
// {rival} {rival_price} {savings} in the comparison bank.
// Only category templates mention {trend}; the generic bank must read well
// when the lead tag was synthesized.

const SPORTS_HOOKS: &[&str] = &["Game day is here.", "Big match tonight.", "The crowd is loud tonight."];
const ENTERTAINMENT_HOOKS: &[&str] = &[
    "Everyone is watching.",
    "The internet is buzzing.",
    "Streams are busy tonight.",
];
const NEWS_HOOKS: &[&str] = &["Big news today.", "Headlines are moving fast.", "The news never sleeps."];
const TECH_HOOKS: &[&str] = &["Builders, this one is for you.", "New week, new models.", "Ship it today."];
const OTHER_HOOKS: &[&str] = &[
    "Need more GPU power?",
    "Your next model deserves better hardware.",
    "Compute without the wait.",
];

pub fn hooks(category: Category) -> &'static [&'static str] {
    match category {
        Category::Sports => SPORTS_HOOKS,
        Category::Entertainment => ENTERTAINMENT_HOOKS,
        Category::News => NEWS_HOOKS,
        Category::Tech => TECH_HOOKS,
        Category::Other => OTHER_HOOKS,
    }
}

/// Templates written for one (category, angle) pair. Empty when only the
/// generic bank applies.
pub fn category_bank(category: Category, angle: MarketingAngle) -> &'static [&'static str] {
    use Category::*;
    use MarketingAngle::*;

    match (category, angle) {
        (Sports, Cost) => &["Watching {trend}? Rent {model} for {price} while the game is on. Code {code} {url}"],
        (Sports, Latency) => &[
            "Every second counts during {trend}. Serve live streams with low latency on {model}. Code {code} {url}",
        ],
        (Sports, Autoscale) => &[
            "{trend} traffic is about to spike. Autoscale {model} in seconds and pay per hour. Code {code} {url}",
            "{hook} When {trend} fans flood in, scale GPUs up, then back down. Code {code} {url}",
        ],
        (Sports, Regions) => &["Fans of {trend} are everywhere. Serve them from {model} in {region}. Code {code} {url}"],
        (Sports, Uptime) => &["{hook} No outage during {trend}. Keep {model} online around the clock. Code {code} {url}"],
        (Entertainment, Cost) => &["Everyone is talking about {trend}. Render on {model} for {price}. Code {code} {url}"],
        (Entertainment, Latency) => &["{hook} {trend} streams need speed. Low latency GPUs from {price}. Code {code} {url}"],
        (Entertainment, Autoscale) => &[
            "{trend} is trending and streams are busy. Scale GPUs with the crowd from {price}. Code {code} {url}",
        ],
        (News, Cost) => &["{trend} is in the headlines. Crunch the data on {model} at {price}. Code {code} {url}"],
        (News, Autoscale) => &[
            "{hook} Big news brings big traffic. Autoscale {model} before {trend} peaks. Code {code} {url}",
        ],
        (News, Uptime) => &["{hook} When {trend} breaks, stay online. Reliable {model} from {price}. Code {code} {url}"],
        (Tech, Cost) => &["{trend} is trending. Build it on {model} for {price}. Code {code} {url}"],
        (Tech, Latency) => &["{hook} Fast inference for {trend} on {model} at {price}. Code {code} {url}"],
        (Tech, Regions) => &["Shipping something for {trend}? Deploy on {model} in {region}. Code {code} {url}"],
        (Tech, Support) => &["{hook} Building with {trend}? Real engineers help you ship on {model}. Code {code} {url}"],
        _ => &[],
    }
}

/// Generic templates for each angle, valid for every category.
pub fn generic_bank(angle: MarketingAngle) -> &'static [&'static str] {
    match angle {
        MarketingAngle::Cost => &[
            "{hook} Rent {model} for {price} and pay only for what you use. Promo code {code} {url}",
            "{hook} No contract, no hidden fees: {model} at {price}. Use code {code} at {url}",
            "{hook} Cut your cloud bill with {model} from {price}. Code {code} {url}",
        ],
        MarketingAngle::Latency => &[
            "{hook} Serve models with low latency on {model} in {region}. Code {code} {url}",
            "{hook} Fast inference, zero lag. Spin up {model} at {price}. Code {code} {url}",
            "{hook} Keep response times low with GPUs close to your users. Code {code} {url}",
        ],
        MarketingAngle::Autoscale => &[
            "{hook} Scale from one pod to a full cluster in seconds, from {price}. Code {code} {url}",
            "{hook} Traffic spike? Autoscale {model} up, then back down when it is quiet. Code {code} {url}",
            "{hook} Burst to more GPUs when demand grows and pay per hour. Code {code} {url}",
        ],
        MarketingAngle::Regions => &[
            "{hook} Deploy {model} in {region} or any region near your users. Code {code} {url}",
            "{hook} Run your workloads close to your users, worldwide. {model} from {price}. Code {code} {url}",
            "{hook} Pick a region, launch a pod, serve the world. Code {code} {url}",
        ],
        MarketingAngle::Uptime => &[
            "{hook} Keep your models online around the clock on {model}. Code {code} {url}",
            "{hook} No downtime when it counts. Reliable {model} at {price}. Code {code} {url}",
            "{hook} Stable GPUs that stay up while your traffic peaks. Code {code} {url}",
        ],
        MarketingAngle::Support => &[
            "{hook} Real engineers help you ship on {model}, from {price}. Code {code} {url}",
            "{hook} Stuck on a deploy? Our team answers fast. Code {code} {url}",
            "{hook} Expert support from a human, plus {model} at {price}. Code {code} {url}",
        ],
    }
}

/// Price comparison against a rival provider. Only used when the offer
/// carries a rival price above its own.
pub fn comparison_bank(angle: MarketingAngle) -> &'static [&'static str] {
    match angle {
        MarketingAngle::Cost => &[
            "{hook} {rival} charges {rival_price}. Run {model} at {price}, {savings}% less. Code {code} {url}",
            "{hook} Skip the markup: {model} at {price}, {savings}% below {rival} at {rival_price}. Code {code} {url}",
        ],
        _ => &[],
    }
}

/// Canned post used when every template attempt fails validation.
pub const FALLBACK_TEMPLATE: &str =
    "On-demand GPUs, ready when you are. {model} from {price}. Promo code {code} {url}";

pub const FALLBACK_HASHTAG: &str = "CloudGPU";

/// Rendered in place of {region} when an offer names none.
pub const ANY_REGION: &str = "the region of your choice";
