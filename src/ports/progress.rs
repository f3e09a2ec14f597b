/// Fire-and-forget status text, e.g. "Processing part 2 of 5".
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_is_a_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |message: &str| seen.lock().unwrap().push(message.to_string());

        sink.report("Processing part 1 of 2");
        sink.report("Processing part 2 of 2");

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Processing part 1 of 2", "Processing part 2 of 2"]
        );
    }
}
