//! ABI bindings for the contracts the gateway talks to.

#![allow(missing_docs, reason = "generated contract bindings")]

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract Library {
        event LogAddedBook(bytes32 indexed id, string name, uint256 copies);
        event LogBookBorrowed(bytes32 indexed id, address indexed borrower);
        event LogBookReturned(bytes32 indexed id, address indexed borrower);

        function createBook(uint256 copies, string memory name) external;
        function borrowBook(bytes32 id) external;
        function returnBook(bytes32 id) external;
        function withdrawLibraryBalance() external;

        function viewAllBooksCount() external view returns (uint256);
        function allBookIDs(uint256 index) external view returns (bytes32);
        function books(bytes32 id) external view returns (string memory name, uint256 availableCopiesCount);
        function borrowedBooks(address account, bytes32 id) external view returns (bool);
    }

    #[sol(rpc)]
    contract LibToken {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    contract LibWrapper {
        event LogLIBUnwrapped(address indexed sender, uint256 amount);

        function wrap() external payable;
        function unwrap(uint256 amount) external;
    }
}
