use ethers::core::rand::thread_rng;
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;

fn env_lines(wallet: &LocalWallet) -> [String; 2] {
    [
        format!(
            "WALLET_PRIVATE_KEY=0x{}",
            hex::encode(wallet.signer().to_bytes())
        ),
        format!("WALLET_PUBLIC_KEY={}", to_checksum(&wallet.address(), None)),
    ]
}

fn main() {
    let wallet = LocalWallet::new(&mut thread_rng());

    println!("\n=== Test Wallet Generated ===\n");
    for line in env_lines(&wallet) {
        println!("{line}");
    }
    println!("\nThis is a TEST wallet. Do NOT use it with real funds!\n");
}
