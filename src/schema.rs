// Hand-maintained to match the DDL in repository/context.rs.

diesel::table! {
    players (player_name) {
        player_name -> Text,
    }
}

diesel::table! {
    matches (match_id) {
        match_id -> BigInt,
        season -> Text,
        venue -> Text,
    }
}

diesel::table! {
    deliveries (match_id, innings, delivery_seq) {
        match_id -> BigInt,
        innings -> Integer,
        delivery_seq -> Integer,
        season -> Text,
        venue -> Text,
        over_number -> Integer,
        ball -> Integer,
        batting_team -> Text,
        batter -> Text,
        bowler -> Text,
        non_striker -> Text,
        runs_batter -> Integer,
        runs_extras -> Integer,
        extras_type -> Nullable<Text>,
        is_legal_ball -> Bool,
        is_wicket -> Bool,
        dismissed_batter -> Nullable<Text>,
        wicket_type -> Nullable<Text>,
        phase -> Text,
    }
}

diesel::joinable!(deliveries -> matches (match_id));

diesel::allow_tables_to_appear_in_same_query!(deliveries, matches, players,);
