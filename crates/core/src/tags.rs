/// Name fragment (lowercase) to topic tag. Order decides tag order.
pub const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("mlops", "mlops"),
    ("production", "production"),
    ("data", "data"),
    ("vision", "cv"),
    ("computer vision", "cv"),
    ("nlp", "nlp"),
    ("генератив", "genai"),
    ("продукт", "product"),
    ("менедж", "pm"),
    ("архитектур", "arch"),
    ("big data", "bigdata"),
    ("облач", "cloud"),
];

pub fn tags_for(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (keyword, tag) in TAG_KEYWORDS {
        if lower.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push((*tag).to_string());
        }
    }
    tags
}
