/// Where a user can create a key for the given provider.
pub fn api_key_website(provider_id: &str) -> Option<&'static str> {
    let url = match provider_id {
        "openai" => "https://platform.openai.com/api-keys",
        "anthropic" => "https://console.anthropic.com/settings/keys",
        "deepseek" => "https://platform.deepseek.com/api_keys",
        "openrouter" => "https://openrouter.ai/settings/keys",
        "gemini" => "https://aistudio.google.com/app/apikey",
        "groq" => "https://console.groq.com/keys",
        "mistral" => "https://console.mistral.ai/api-keys",
        "silicon" => "https://cloud.siliconflow.cn/account/ak",
        "moonshot" => "https://platform.moonshot.cn/console/api-keys",
        _ => return None,
    };
    Some(url)
}
