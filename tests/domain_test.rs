// tests/domain_test.rs

//! Доменные тесты: монеты, кости, базар, борд, комната, профиль.

use std::collections::HashSet;

use nexus_casino::domain::{
    Board, Boneyard, Coins, DominoPiece, End, GameKind, Identity, Member, OpenEnds, Placement,
    Room, RoomStatus, User, FULL_SET_SIZE,
};

#[test]
fn coins_delta_never_goes_negative() {
    let c = Coins::new(100);
    assert_eq!(c.apply_delta(50), Some(Coins(150)));
    assert_eq!(c.apply_delta(-100), Some(Coins::ZERO));
    assert_eq!(c.apply_delta(-101), None);
    assert_eq!(c.checked_sub(Coins(30)), Some(Coins(70)));
    assert_eq!(Coins(100).times(3), Coins(300));
    assert_eq!(Coins(5) - Coins(10), Coins::ZERO);
}

#[test]
fn full_set_has_28_unique_pieces_with_canonical_ids() {
    let set = DominoPiece::full_set();
    assert_eq!(set.len(), FULL_SET_SIZE);

    let ids: HashSet<u8> = set.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 28);
    assert_eq!(set[0], DominoPiece::new(0, 0, 0));
    assert_eq!(set[27], DominoPiece::new(27, 6, 6));

    // side1 <= side2 в каноническом порядке.
    assert!(set.iter().all(|p| p.side1 <= p.side2));
    assert_eq!(set.iter().filter(|p| p.is_double()).count(), 7);
}

#[test]
fn piece_parsing_accepts_common_forms() {
    let a: DominoPiece = "3-5".parse().unwrap();
    let b: DominoPiece = "[5|3]".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "[3|5]");
    assert_eq!(a.pip_total(), 8);

    assert!("7-1".parse::<DominoPiece>().is_err());
    assert!("1-2-3".parse::<DominoPiece>().is_err());
}

#[test]
fn double_outranks_any_plain_piece_for_start() {
    let double_one = DominoPiece::from_pips(1, 1).unwrap();
    let five_six = DominoPiece::from_pips(5, 6).unwrap();
    assert!(double_one.starter_score() > five_six.starter_score());
}

#[test]
fn boneyard_deals_from_front_and_draws_from_back() {
    let mut boneyard = Boneyard::double_six();
    let hand = boneyard.deal(7);
    assert_eq!(hand.len(), 7);
    assert_eq!(hand[0].id, 0);
    assert_eq!(boneyard.len(), 21);

    let drawn = boneyard.draw_one().unwrap();
    assert_eq!(drawn.id, 27);
    assert_eq!(boneyard.len(), 20);

    let mut empty = Boneyard::empty();
    assert!(empty.draw_one().is_none());
}

#[test]
fn board_tracks_open_ends_on_both_sides() {
    let mut board = Board::new();
    assert_eq!(board.open_ends(), None);
    assert!(board.place(DominoPiece::new(0, 1, 1), End::Left).is_none());

    assert!(board.place_start(DominoPiece::from_pips(3, 5).unwrap()));
    assert!(!board.place_start(DominoPiece::from_pips(1, 1).unwrap()));
    assert_eq!(board.open_ends(), Some(OpenEnds { left: 3, right: 5 }));

    // [3|3] слева, [5|1] справа (развернётся: наружу 1).
    board.place(DominoPiece::from_pips(3, 3).unwrap(), End::Left).unwrap();
    let placed = board
        .place(DominoPiece::from_pips(1, 5).unwrap(), End::Right)
        .unwrap();
    assert_eq!(placed.placement, Placement::Right);
    assert!(placed.flipped);
    assert_eq!(placed.displayed(), (5, 1));
    assert_eq!(board.open_ends(), Some(OpenEnds { left: 3, right: 1 }));

    let chain: Vec<(u8, u8)> = board.chain().iter().map(|p| p.displayed()).collect();
    assert_eq!(chain, vec![(3, 3), (3, 5), (5, 1)]);
    assert_eq!(board.len(), 3);
}

#[test]
fn new_room_holds_creator_wager() {
    let user = User::new("u1".into(), "Ana".into(), "x".into(), 1, Coins(5_000));
    let room = Room::new("ROOM_AAAAAA".into(), Member::from_user(&user), GameKind::Dominoes, 2, Coins(100));

    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.pot, Coins(100));
    assert_eq!(room.pot, room.expected_pot());
    assert!(room.has_player("u1"));
    assert!(!room.is_full());
    assert!(!room.practice);
}

#[test]
fn identity_without_name_or_photo_gets_defaults() {
    let identity = Identity {
        user_id: "abc".into(),
        display_name: Some("   ".into()),
        photo_url: None,
    };
    let user = User::from_identity(&identity, 1, Coins(5_000));
    assert_eq!(user.name, User::DEFAULT_NAME);
    assert!(user.photo_url.contains("seed=abc"));
    assert!(user.is_online());
}

#[test]
fn game_kinds_cap_table_size() {
    assert_eq!(GameKind::Dominoes.max_players(), 4);
    assert_eq!(GameKind::PokerLite.max_players(), 6);
    assert_eq!(GameKind::Dominoes.label(), "Dominó");
}
