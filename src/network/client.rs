//! Client
//!
//! Blocking TCP client speaking the request/response protocol.

use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{RankError, Result};
use crate::protocol::{encode_request, read_response, Command, Limits, Request, Value};

/// A connection to a RankKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    limits: Limits,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| RankError::Network(format!("connect failed: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            limits: Limits::default(),
        })
    }

    /// Send one request and wait for its response
    pub fn request(&mut self, request: &Request) -> Result<Value> {
        self.send(request)?;
        self.flush()?;
        self.receive()
    }

    /// Send a request built from string-like parts, e.g. `["get", "k"]`
    pub fn call<I, S>(&mut self, parts: I) -> Result<Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.request(&Request::from_parts(parts))
    }

    /// Send a typed command
    pub fn execute(&mut self, command: &Command) -> Result<Value> {
        self.request(&command.to_request())
    }

    // =========================================================================
    // Pipelining
    // =========================================================================

    /// Queue a request without waiting for the response
    pub fn send(&mut self, request: &Request) -> Result<()> {
        self.writer.write_all(&encode_request(request))?;
        Ok(())
    }

    /// Push queued requests to the server
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Read the next response, in request order
    pub fn receive(&mut self) -> Result<Value> {
        read_response(&mut self.reader, &self.limits)
    }
}
