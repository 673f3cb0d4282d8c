use strum::{Display, EnumIter, IntoEnumIterator};

/// One command of the relay session, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Step {
    #[strum(serialize = "connect")]
    Connect,
    #[strum(serialize = "hello")]
    Greet,
    #[strum(serialize = "start-tls")]
    StartTls,
    #[strum(serialize = "mail from")]
    MailFrom,
    #[strum(serialize = "rcpt to")]
    RcptTo,
    #[strum(serialize = "data")]
    Data,
    #[strum(serialize = "write message")]
    Write,
    #[strum(serialize = "end data")]
    CloseData,
    #[strum(serialize = "quit")]
    Quit,
}

impl Step {
    /// Steps run on an open connection, STARTTLS included only when asked for.
    pub fn sequence(starttls: bool) -> impl Iterator<Item = Step> {
        Step::iter()
            .skip(1)
            .filter(move |step| starttls || *step != Step::StartTls)
    }
}
