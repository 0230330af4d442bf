fn main() {
    let mut features = vec!["text".to_string()];
    if cfg!(feature = "pdf") {
        features.push("pdf".to_string());
    }
    if cfg!(feature = "docx") {
        features.push("docx".to_string());
    }
    println!("cargo:rustc-env=ADVISOR_FEATURES={}", features.join(", "));
}
