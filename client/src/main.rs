use actix::Actor;
use client::client_actors::ui_handler::{Command, UIHandler};
use client::engine::{EngineParts, PairingEngine};
use client::messages::internal_messages::{StartPairing, SubscribePair};
use client::messages::ui_messages::UIMessage;
use colored::Color;
use common::config::ClientConfig;
use common::logger::Logger;
use common::utils::print_welcome_message;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::signal::ctrl_c;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

#[actix::main]
async fn main() -> std::io::Result<()> {
    print_welcome_message();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let logger = Logger::new("Food Fight", Color::BrightWhite).with_verbose(config.verbose);

    let engine = PairingEngine::mount(EngineParts::from_config(&config)?);
    let api_url = (!config.test_mode).then(|| config.api_url.clone());
    let ui = UIHandler::new(
        engine.presenter.clone(),
        engine.favorites.clone(),
        api_url,
        Logger::new("UI", Color::White).with_verbose(config.verbose),
    )
    .start();

    engine.presenter.do_send(SubscribePair {
        recipient: ui.clone().recipient(),
    });
    engine.presenter.do_send(StartPairing);
    ui.do_send(UIMessage::ShowMessage(
        "Type 'help' to see the commands".to_string(),
    ));

    let mut lines = LinesStream::new(BufReader::new(stdin()).lines());
    loop {
        tokio::select! {
            _ = ctrl_c() => {
                logger.info("Ctrl-C received, shutting down...");
                break;
            }
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    if matches!(Command::parse(&line), Ok(Command::Quit)) {
                        break;
                    }
                    ui.do_send(UIMessage::UserInput(line));
                }
                Some(Err(e)) => {
                    logger.error(format!("Could not read input: {}", e));
                    break;
                }
                None => break,
            },
        }
    }

    engine.unmount();
    actix::System::current().stop();
    Ok(())
}
