//! Telnet option negotiation (RFC 854/855).
//!
//! The device CLI needs nothing beyond a plain character stream, so the client
//! accepts the server's ECHO and SUPPRESS-GO-AHEAD offers and refuses every other
//! option. Subnegotiations are skipped.

use std::collections::HashSet;

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const SE: u8 = 240;

pub const OPT_ECHO: u8 = 1;
pub const OPT_SGA: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Sub,
    SubIac,
}

/// Bytes left after stripping telnet commands, plus the replies owed to the server.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub data: Vec<u8>,
    pub replies: Vec<u8>,
}

/// Incremental decoder; commands split across reads are handled.
#[derive(Debug, Default)]
pub struct Negotiator {
    state: State,
    answered: HashSet<(u8, u8)>,
}

impl Negotiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, input: &[u8]) -> Decoded {
        let mut out = Decoded::default();

        for &byte in input {
            self.state = match self.state {
                State::Data => match byte {
                    IAC => State::Iac,
                    0 => State::Data,
                    _ => {
                        out.data.push(byte);
                        State::Data
                    }
                },
                State::Iac => match byte {
                    IAC => {
                        out.data.push(IAC);
                        State::Data
                    }
                    DO | DONT | WILL | WONT => State::Negotiate(byte),
                    SB => State::Sub,
                    _ => State::Data,
                },
                State::Negotiate(command) => {
                    self.answer(command, byte, &mut out.replies);
                    State::Data
                }
                State::Sub => match byte {
                    IAC => State::SubIac,
                    _ => State::Sub,
                },
                State::SubIac => match byte {
                    SE => State::Data,
                    _ => State::Sub,
                },
            };
        }

        out
    }

    fn answer(&mut self, command: u8, option: u8, replies: &mut Vec<u8>) {
        let reply = match (command, option) {
            (WILL, OPT_ECHO | OPT_SGA) => DO,
            (WILL, _) => DONT,
            (DO, _) => WONT,
            // DONT/WONT need no acknowledgement for options that are already off.
            _ => return,
        };
        if self.answered.insert((command, option)) {
            replies.extend_from_slice(&[IAC, reply, option]);
        }
    }
}
