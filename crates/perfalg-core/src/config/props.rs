/// Split an `.alg` file into property pairs and algorithm text.
///
/// Every line up to and including the last one with `=` past its first character is a
/// property line. Blank lines and lines starting with `#` or `!` are skipped there.
pub fn split_alg_text(text: &str) -> (Vec<(String, String)>, String) {
    let lines: Vec<&str> = text.lines().collect();
    let last_prop = lines
        .iter()
        .rposition(|l| l.find('=').is_some_and(|i| i > 0));

    let Some(last_prop) = last_prop else {
        return (Vec::new(), text.to_string());
    };

    let props = lines[..=last_prop]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('!'))
        .filter_map(|l| {
            let (k, v) = l.split_once('=')?;
            let k = k.trim();
            (!k.is_empty()).then(|| (k.to_string(), v.trim().to_string()))
        })
        .collect();

    let mut algorithm = lines[last_prop + 1..].join("\n");
    if !algorithm.is_empty() {
        algorithm.push('\n');
    }
    (props, algorithm)
}
