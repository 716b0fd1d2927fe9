use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin},
    sync::Mutex,
};

use crate::{domain::GroupHandle, ports::GroupSelector, Result};

/// Interactive selector: prints numbered candidates and reads an index.
///
/// Re-prompts on invalid input; end of input cancels.
pub struct PromptSelector<R> {
    input: Mutex<R>,
}

impl PromptSelector<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> PromptSelector<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> GroupSelector for PromptSelector<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn select(&self, prompt: &str, candidates: &[GroupHandle]) -> Result<Option<usize>> {
        println!("{prompt}");
        for (i, group) in candidates.iter().enumerate() {
            println!("{i}- {}", group.title);
        }

        let mut input = self.input.lock().await;
        loop {
            println!("Enter the number: ");
            let mut line = String::new();
            if input.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            match parse_choice(&line, candidates.len()) {
                Some(idx) => return Ok(Some(idx)),
                None => println!("Not a valid choice, try again"),
            }
        }
    }
}

fn parse_choice(line: &str, len: usize) -> Option<usize> {
    line.trim().parse::<usize>().ok().filter(|i| *i < len)
}
