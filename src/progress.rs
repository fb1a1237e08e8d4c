use std::time::Duration;
use std::iter::Enumerate;

use indicatif::ProgressBar;
use indicatif::ProgressStyle;


pub(crate) trait ProgressObserver {

    // the parameters are passed as callbacks in case the progress implementation doesn't care (such as if its ())
    fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, callback: Callback);

    fn update<Callback: FnOnce() -> usize>(&self, callback: Callback);

    fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback);

    fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback);

    /// Removes an unfinished progress indicator, for when the work it tracked was abandoned.
    fn clear(&mut self);

    /// Prints a heading for the next step of a pipeline.
    fn announce(&self, message: &str);

}


// This one allows for not observing when you don't need it.
impl ProgressObserver for () {

    fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, _: Callback) {
    }

    fn update<Callback: FnOnce() -> usize>(&self, _: Callback) {
    }

    fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, _: Callback){
    }

    fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, _: Callback) {
    }

    fn clear(&mut self) {
    }

    fn announce(&self, _: &str) {
    }
}


pub(crate) struct ConsoleProgressBar {

    bar: Option<ProgressBar>

}

impl ConsoleProgressBar {

    pub(crate) const fn new() -> Self {
        Self {
            bar: None
        }
    }

    // the templates are constant, so a failure here is a programming error and falls back to the default style.
    fn style(template: &str) -> ProgressStyle {
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn style_as_spinner(bar: &ProgressBar) {
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(Self::style("({elapsed_precise}) {msg} {spinner}"));
    }

    fn style_as_progress(bar: &ProgressBar) {
        bar.disable_steady_tick();
        bar.set_style(Self::style("({elapsed_precise}) [{bar:40}] [ETA: {eta_precise}] {msg}").progress_chars("=> "));
    }

    fn style_as_finished(bar: &ProgressBar) {
        bar.set_style(Self::style("({elapsed_precise}) {msg}"));
    }

}

impl ProgressObserver for ConsoleProgressBar {

    fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, callback: Callback) {
        let (message,step_count) = callback();
        let bar = self.bar.get_or_insert_with(ProgressBar::new_spinner);
        bar.reset();
        if let Some(step_count) = step_count {
            bar.set_length(step_count as u64);
            Self::style_as_progress(bar)
        } else {
            Self::style_as_spinner(bar);
        }
        bar.set_message(message.as_ref().to_owned());
    }

    fn update<Callback: FnOnce() -> usize>(&self, callback: Callback) {
        if let Some(bar) = &self.bar {
            bar.set_position(callback() as u64);
        }
    }

    fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback){
        let message = format!("WARNING: {}",callback().as_ref());
        if let Some(bar) = &self.bar {
            bar.println(message)
        } else {
            eprintln!("{message}")
        }
    }

    fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback) {
        if let Some(bar) = self.bar.take() {
            Self::style_as_finished(&bar);
            bar.finish_with_message(callback().as_ref().to_owned());
        }
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn announce(&self, message: &str) {
        let message = format!("== {message} ==");
        if let Some(bar) = &self.bar {
            bar.println(message)
        } else {
            println!("{message}")
        }
    }

}

pub(crate) struct IteratorWatcher<'progress,Message: AsRef<str>, Progress: ProgressObserver, IteratorType> {
    finish: Message,
    progress: &'progress mut Progress,
    inner: Enumerate<IteratorType>,
    finished: bool
}

impl<Message: AsRef<str>, Progress: ProgressObserver, ItemType, IteratorType: Iterator<Item=ItemType>> Iterator for IteratorWatcher<'_,Message,Progress,IteratorType> {

    type Item = ItemType;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((i,next)) = self.inner.next() {
            self.progress.update(|| i);
            Some(next)
        } else {
            if !self.finished {
                self.finished = true;
                self.progress.finish(|| &self.finish);
            }
            None
        }

    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }


}

// a loop left early, usually by `?`, doesn't get to the finish.
impl<Message: AsRef<str>, Progress: ProgressObserver, IteratorType> Drop for IteratorWatcher<'_,Message,Progress,IteratorType> {

    fn drop(&mut self) {
        if !self.finished {
            self.progress.clear();
        }
    }
}

pub(crate) trait WatchableIterator: Iterator + Sized {

    fn watch<StartMessage: AsRef<str>, FinishMessage: AsRef<str>, Progress: ProgressObserver>(self, progress: &mut Progress, start: StartMessage, finish: FinishMessage) -> IteratorWatcher<'_, FinishMessage, Progress, Self>;
}

impl<IteratorType: Iterator> WatchableIterator for IteratorType {

    fn watch<StartMessage: AsRef<str>, FinishMessage: AsRef<str>, Progress: ProgressObserver>(self, progress: &mut Progress, start: StartMessage, finish: FinishMessage) -> IteratorWatcher<'_, FinishMessage, Progress, Self> {
        progress.start(|| (start,self.size_hint().1));
        IteratorWatcher {
            finish,
            progress,
            inner: self.enumerate(),
            finished: false
        }

    }


}

#[cfg(test)]
mod test {

    use std::cell::RefCell;

    use super::ProgressObserver;
    use super::WatchableIterator;

    #[derive(Default)]
    struct RecordingProgress {
        events: RefCell<Vec<String>>
    }

    impl ProgressObserver for RecordingProgress {

        fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, callback: Callback) {
            let (message,steps) = callback();
            self.events.borrow_mut().push(format!("start {} {:?}",message.as_ref(),steps));
        }

        fn update<Callback: FnOnce() -> usize>(&self, callback: Callback) {
            self.events.borrow_mut().push(format!("update {}",callback()));
        }

        fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback) {
            self.events.borrow_mut().push(format!("warning {}",callback().as_ref()));
        }

        fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback) {
            self.events.borrow_mut().push(format!("finish {}",callback().as_ref()));
        }

        fn clear(&mut self) {
            self.events.borrow_mut().push("clear".to_owned());
        }

        fn announce(&self, message: &str) {
            self.events.borrow_mut().push(format!("announce {message}"));
        }
    }

    #[test]
    fn test_watch_reports_every_item() {
        let mut progress = RecordingProgress::default();
        let items: Vec<i64> = vec![4,5].into_iter().watch(&mut progress, "basins", "done").collect();
        assert_eq!(items,vec![4,5]);
        assert_eq!(progress.events.into_inner(),vec![
            "start basins Some(2)",
            "update 0",
            "update 1",
            "finish done"
        ]);
    }

    #[test]
    fn test_watch_clears_when_abandoned() {
        let mut progress = RecordingProgress::default();
        let result: Result<Vec<i64>,String> = vec![4,5,6].into_iter().watch(&mut progress, "basins", "done").map(|item| {
            if item == 5 {
                Err(format!("bad basin {item}"))
            } else {
                Ok(item)
            }
        }).collect();
        assert_eq!(result,Err("bad basin 5".to_owned()));
        assert_eq!(progress.events.into_inner(),vec![
            "start basins Some(3)",
            "update 0",
            "update 1",
            "clear"
        ]);
    }

}
