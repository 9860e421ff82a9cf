/// Join phrases as an English list without the Oxford comma: "a, b and c".
pub fn compose<S: AsRef<str>>(phrases: &[S]) -> String {
    match phrases.split_last() {
        None => String::new(),
        Some((last, [])) => last.as_ref().to_string(),
        Some((last, rest)) => {
            let head: Vec<&str> = rest.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}
