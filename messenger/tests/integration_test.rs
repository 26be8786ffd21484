//! End-to-end exercise of the relay dispatcher over a real TCP loopback
//! connection.

use anyhow::Result;
use messenger::framing::{read_frame, write_frame};
use messenger::server::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn send_and_recv(stream: &mut TcpStream, frame: &[u8]) -> Vec<u8> {
    write_frame(stream, frame).await.unwrap();
    read_frame(stream).await.unwrap()
}

#[tokio::test]
async fn associate_push_get_round_trip() -> Result<()> {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await?;
    let addr = server.local_addr();
    tokio::spawn(server.run());

    let mut sender = TcpStream::connect(addr).await?;
    let resp = send_and_recv(&mut sender, &[0, 0, 7]).await;
    assert_eq!(resp, vec![0, 1, 7]);

    let mut push = vec![2, 1, 7, 9];
    push.push(2);
    push.extend_from_slice(b"hi");
    let resp = send_and_recv(&mut sender, &push).await;
    assert_eq!(resp, vec![1, 2, 7]);

    let mut receiver = TcpStream::connect(addr).await?;
    let resp = send_and_recv(&mut receiver, &[0, 0, 9]).await;
    assert_eq!(resp, vec![0, 1, 9]);

    let resp = send_and_recv(&mut receiver, &[1, 0, 9]).await;
    let mut expected = vec![2, 0, 9, 7, 2];
    expected.extend_from_slice(b"hi");
    assert_eq!(resp, expected);

    let resp = send_and_recv(&mut receiver, &[1, 0, 9]).await;
    assert_eq!(resp, vec![1, 1, 9]);

    drop(sender);
    drop(receiver);
    let _ = AsyncWriteExt::flush(&mut TcpStream::connect(addr).await?).await;
    Ok(())
}

#[tokio::test]
async fn a_full_mailbox_rejects_the_101st_push() -> Result<()> {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await?;
    let addr = server.local_addr();
    tokio::spawn(server.run());

    let mut client = TcpStream::connect(addr).await?;
    let _ = send_and_recv(&mut client, &[0, 0, 1]).await;

    for _ in 0..100 {
        let push = vec![2, 1, 1, 9, 1, 0xAB];
        let resp = send_and_recv(&mut client, &push).await;
        assert_eq!(resp, vec![1, 2, 1]);
    }

    let push = vec![2, 1, 1, 9, 1, 0xAB];
    let resp = send_and_recv(&mut client, &push).await;
    assert_eq!(resp, vec![1, 3, 1]);
    Ok(())
}

#[tokio::test]
async fn second_associate_of_same_id_fails() -> Result<()> {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await?;
    let addr = server.local_addr();
    tokio::spawn(server.run());

    let mut first = TcpStream::connect(addr).await?;
    let resp = send_and_recv(&mut first, &[0, 0, 3]).await;
    assert_eq!(resp, vec![0, 1, 3]);

    let mut second = TcpStream::connect(addr).await?;
    let resp = send_and_recv(&mut second, &[0, 0, 3]).await;
    assert_eq!(resp, vec![0, 3, 3]);

    let mut buf = [0u8; 1];
    let _ = AsyncReadExt::read(&mut second, &mut buf).await;
    Ok(())
}

#[tokio::test]
async fn get_from_unassociated_id_fails() -> Result<()> {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await?;
    let addr = server.local_addr();
    tokio::spawn(server.run());

    let mut client = TcpStream::connect(addr).await?;
    let resp = send_and_recv(&mut client, &[1, 0, 42]).await;
    assert_eq!(resp, vec![0, 2, 42]);
    Ok(())
}

#[tokio::test]
async fn malformed_frame_gets_unknown_error() -> Result<()> {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await?;
    let addr = server.local_addr();
    tokio::spawn(server.run());

    let mut client = TcpStream::connect(addr).await?;
    // type 9 / message 9 is not a recognized combination.
    let resp = send_and_recv(&mut client, &[9, 9, 1]).await;
    assert_eq!(resp, vec![0, 3, 1]);
    Ok(())
}
