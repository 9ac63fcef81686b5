use actix::Message;

/// Messages the terminal front end accepts.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub enum UIMessage {
    /// One line typed by the user.
    UserInput(String),
    ShowMessage(String),
}
