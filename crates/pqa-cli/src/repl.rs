//! Interactive loop behind `policy-qa ask`.
//!
//! Every input line is one interaction cycle and is followed by a full
//! re-render of the page, like a browser front end rebuilding its view.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use pqa_cli::app::Frontend;
use pqa_cli::input::{HELP, InputCommand, SearchBar, parse_line};
use pqa_client::BackendClient;
use pqa_model::SessionId;

use crate::commands::{SEARCH_MESSAGE, STARTUP_MESSAGE, print_upload_reports, spinner};

const PROMPT: &str = "question> ";

pub fn run<B: BackendClient>(frontend: &Frontend<B>) -> Result<()> {
    let session = SessionId::generate();
    let state = frontend.controller().session(&session);
    let mut search_bar = SearchBar::new(state.question);
    let mut params = state.params;
    let mut show_raw = false;

    let interaction = search_bar.interaction(params);
    let outcome = frontend.interact(&session, &interaction, || {});
    search_bar.sync(&interaction, &outcome);
    println!("{}", frontend.page().render(&outcome, search_bar.text(), show_raw));
    println!("{HELP}");
    params = outcome.state.params;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n{PROMPT}");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        let interaction = match command {
            InputCommand::Quit => break,
            InputCommand::Help => {
                println!("{HELP}");
                continue;
            }
            InputCommand::Question(question) => {
                search_bar.set(question);
                search_bar.interaction(params)
            }
            InputCommand::Clear => {
                search_bar.clear();
                search_bar.interaction(params)
            }
            InputCommand::Refresh => search_bar.interaction(params),
            InputCommand::Run => search_bar.interaction(params).with_run(),
            InputCommand::Random => search_bar.interaction(params).with_random(),
            InputCommand::Reader(value) => {
                params.top_k_reader = value;
                search_bar.interaction(params)
            }
            InputCommand::Retriever(value) => {
                params.top_k_retriever = value;
                search_bar.interaction(params)
            }
            InputCommand::ToggleRaw => {
                show_raw = !show_raw;
                search_bar.interaction(params)
            }
            InputCommand::Upload(paths) => {
                match frontend.upload(&paths) {
                    Ok(reports) => print_upload_reports(&reports),
                    Err(err) => eprintln!("{}", err.user_message()),
                }
                search_bar.interaction(params)
            }
        };

        let progress = spinner(STARTUP_MESSAGE);
        let outcome = frontend.interact(&session, &interaction, || {
            progress.set_message(SEARCH_MESSAGE);
        });
        progress.finish_and_clear();
        search_bar.sync(&interaction, &outcome);
        println!("{}", frontend.page().render(&outcome, search_bar.text(), show_raw));
        params = outcome.state.params;
    }

    frontend.end_session(&session);
    Ok(())
}
